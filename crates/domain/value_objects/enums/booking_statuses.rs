use serde::{Deserialize, Serialize};

/// Stored as a small integer. `Accepted` is carried through unchanged; nothing branches on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Accepted,
    Completed,
    Paid,
}

impl BookingStatus {
    pub fn code(&self) -> i16 {
        match self {
            BookingStatus::Pending => 0,
            BookingStatus::Accepted => 1,
            BookingStatus::Completed => 2,
            BookingStatus::Paid => 3,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(BookingStatus::Pending),
            1 => Some(BookingStatus::Accepted),
            2 => Some(BookingStatus::Completed),
            3 => Some(BookingStatus::Paid),
            _ => None,
        }
    }
}
