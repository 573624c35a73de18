//! Cover image storage backends

mod filesystem;

pub use filesystem::FsCoverStore;
