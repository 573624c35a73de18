//! Wall clock in the library's local time zone

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Timelike, Utc};

pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Offset of the library's local time from UTC
    fn offset(&self) -> FixedOffset;

    /// Current local date and time
    fn local_now(&self) -> NaiveDateTime {
        self.now().with_timezone(&self.offset()).naive_local()
    }

    /// Current local date, used for due dates and attendance days
    fn today(&self) -> NaiveDate {
        self.local_now().date()
    }

    /// Current local time of day, truncated to whole seconds
    fn time_of_day(&self) -> NaiveTime {
        let t = self.local_now().time();
        t.with_nanosecond(0).unwrap_or(t)
    }
}

/// Reads the system clock
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}
