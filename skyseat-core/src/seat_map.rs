use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single bookable seat on a flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    #[serde(rename = "seat")]
    pub label: String,
    pub available: bool,
}

impl Seat {
    pub fn free(label: impl Into<String>) -> Self {
        Self { label: label.into(), available: true }
    }
}

/// Per-flight seat inventory. Labels are unique within a map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatMap {
    pub seats: Vec<Seat>,
}

impl SeatMap {
    /// Build a fully available map. Returns the first duplicate label on failure.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut seats = Vec::new();
        for label in labels {
            let label = label.into();
            if !seen.insert(label.clone()) {
                return Err(label);
            }
            seats.push(Seat::free(label));
        }
        Ok(Self { seats })
    }

    /// Row-major cabin layout, six seats per row: `1A..1F, 2A..`.
    pub fn with_standard_layout(seat_count: u32) -> Self {
        const ROW_LETTERS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

        let seats = (0..seat_count)
            .map(|i| {
                let row = i as usize / ROW_LETTERS.len() + 1;
                let letter = ROW_LETTERS[i as usize % ROW_LETTERS.len()];
                Seat::free(format!("{}{}", row, letter))
            })
            .collect();
        Self { seats }
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn find(&self, label: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.label == label)
    }

    pub fn count_available(&self) -> usize {
        self.seats.iter().filter(|s| s.available).count()
    }

    /// Flip every listed seat to occupied.
    ///
    /// Callers must have checked that each label exists and is free; a
    /// violation is a bug in the caller, caught by debug assertions.
    pub fn mark_occupied<'a, I>(&mut self, labels: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for label in labels {
            let seat = self.seats.iter_mut().find(|s| s.label == label);
            debug_assert!(seat.is_some(), "mark_occupied: unknown seat {}", label);
            if let Some(seat) = seat {
                debug_assert!(seat.available, "mark_occupied: seat {} already occupied", label);
                seat.available = false;
            }
        }
    }

    pub fn free_labels(&self) -> Vec<String> {
        self.seats.iter().filter(|s| s.available).map(|s| s.label.clone()).collect()
    }

    pub fn occupied_labels(&self) -> Vec<String> {
        self.seats.iter().filter(|s| !s.available).map(|s| s.label.clone()).collect()
    }
}
