use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate, Weekday};

/// Opening hours and capacity of the shop.
#[derive(Clone, Debug, PartialEq)]
pub struct GarageSchedule {
    opening_hour: u32,
    closing_hour: u32,
    slot_minutes: u32,
    bays: u32,
    work_days: Vec<Weekday>,
}

impl Default for GarageSchedule {
    fn default() -> Self {
        Self {
            opening_hour: 8,
            closing_hour: 16,
            slot_minutes: 60,
            bays: 3,
            work_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
        }
    }
}

impl GarageSchedule {
    pub fn new(
        opening_hour: u32,
        closing_hour: u32,
        slot_minutes: u32,
        bays: u32,
        work_days: Vec<Weekday>,
    ) -> anyhow::Result<Self> {
        if opening_hour >= closing_hour || closing_hour > 24 {
            bail!(
                "Invalid opening hours {}..{}",
                opening_hour,
                closing_hour
            );
        }
        if slot_minutes == 0 || (closing_hour - opening_hour) * 60 % slot_minutes != 0 {
            bail!("Slot length of {} minutes does not divide the work day", slot_minutes);
        }
        if bays == 0 {
            bail!("At least one bay is required");
        }
        if work_days.is_empty() {
            bail!("At least one work day is required");
        }

        let mut work_days = work_days;
        work_days.sort_by_key(|day| day.num_days_from_monday());
        work_days.dedup();

        Ok(Self {
            opening_hour,
            closing_hour,
            slot_minutes,
            bays,
            work_days,
        })
    }

    pub fn opening_hour(&self) -> u32 {
        self.opening_hour
    }

    pub fn closing_hour(&self) -> u32 {
        self.closing_hour
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    /// Number of appointments one slot can hold.
    pub fn bays(&self) -> u32 {
        self.bays
    }

    pub fn work_days(&self) -> &[Weekday] {
        &self.work_days
    }

    pub fn is_work_day(&self, date: NaiveDate) -> bool {
        self.work_days.contains(&date.weekday())
    }

    pub fn slot_count(&self) -> usize {
        ((self.closing_hour - self.opening_hour) * 60 / self.slot_minutes) as usize
    }

    pub fn slot_labels(&self) -> Vec<String> {
        let start = self.opening_hour * 60;
        (0..self.slot_count() as u32)
            .map(|i| {
                let minutes = start + i * self.slot_minutes;
                format!("{:02}:{:02}", minutes / 60, minutes % 60)
            })
            .collect()
    }
}

/// Parses a work day list numbered `0 = Sunday` through `6 = Saturday`, e.g. `1,2,3,4,5`.
pub fn parse_work_days(s: &str) -> anyhow::Result<Vec<Weekday>> {
    const WEEK: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let n = part
                .parse::<usize>()
                .with_context(|| format!("Invalid weekday number '{}'", part))?;
            WEEK.get(n)
                .copied()
                .with_context(|| format!("Weekday number {} out of range 0..=6", n))
        })
        .collect()
}
