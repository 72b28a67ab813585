use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Ordering applied by the geo ranking engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NearbyPolicy {
    BestRating,
    Nearest,
}

/// Ordering requested for a service listing. Encoded on the wire as 0, 1 and 2.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ListingPolicy {
    BestRating,
    Nearest,
    Recent,
}

impl ListingPolicy {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ListingPolicy::BestRating),
            1 => Some(ListingPolicy::Nearest),
            2 => Some(ListingPolicy::Recent),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ListingPolicy::BestRating => 0,
            ListingPolicy::Nearest => 1,
            ListingPolicy::Recent => 2,
        }
    }

    /// `None` for `Recent`, which ignores location entirely.
    pub fn nearby_policy(&self) -> Option<NearbyPolicy> {
        match self {
            ListingPolicy::BestRating => Some(NearbyPolicy::BestRating),
            ListingPolicy::Nearest => Some(NearbyPolicy::Nearest),
            ListingPolicy::Recent => None,
        }
    }
}

impl Display for ListingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ListingPolicy::BestRating => "best_rating",
            ListingPolicy::Nearest => "nearest",
            ListingPolicy::Recent => "recent",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_map_to_policies() {
        assert_eq!(ListingPolicy::from_code(0), Some(ListingPolicy::BestRating));
        assert_eq!(ListingPolicy::from_code(1), Some(ListingPolicy::Nearest));
        assert_eq!(ListingPolicy::from_code(2), Some(ListingPolicy::Recent));
        assert_eq!(ListingPolicy::from_code(3), None);
        assert_eq!(ListingPolicy::Recent.nearby_policy(), None);
        assert_eq!(
            ListingPolicy::Nearest.nearby_policy(),
            Some(NearbyPolicy::Nearest)
        );
    }
}
