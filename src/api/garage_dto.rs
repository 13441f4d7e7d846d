use serde::{Deserialize, Serialize};

/// One entry of `GET /garage/sectors`.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectorDto {
    pub sector: String,
    #[serde(default)]
    pub base_price: f64,
    pub max_capacity: u32,
    pub occupied_spots: u32,
    /// Fraction in [0, 1].
    #[serde(default)]
    pub occupancy_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_sector_list() {
        let json = r#"[
            {"sector": "A", "basePrice": 10.0, "maxCapacity": 100, "occupiedSpots": 42, "occupancyRate": 0.42},
            {"sector": "B", "maxCapacity": 50, "occupiedSpots": 0}
        ]"#;

        let sectors: Vec<SectorDto> = serde_json::from_str(json).unwrap();

        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors[0].occupied_spots, 42);
        assert_eq!(sectors[1].occupancy_rate, 0.0);
    }
}
