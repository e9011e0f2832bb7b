//! 承运商默认步骤
//!
//! 未 seed 的轨迹在首次轮询时按承运商取一组内置步骤，未知承运商使用通用两步。

use super::track_state::TrackStep;

/// 取承运商的默认步骤
pub fn default_steps_for(carrier: &str) -> Vec<TrackStep> {
    match carrier {
        "CDEK" => vec![
            TrackStep::new("IN_TRANSIT", "CDEK: accepted", Some("Moscow"), Some("Accepted")),
            TrackStep::new(
                "IN_TRANSIT",
                "CDEK: in transit",
                Some("Sorting center"),
                Some("In transit"),
            ),
            TrackStep::new(
                "DELIVERED",
                "CDEK: delivered",
                Some("Destination"),
                Some("Delivered"),
            ),
        ],
        "POST_RU" => vec![
            TrackStep::new("IN_TRANSIT", "POST_RU: accepted", Some("Москва"), Some("Принято")),
            TrackStep::new("IN_TRANSIT", "POST_RU: processing", Some("СЦ"), Some("Обработка")),
            TrackStep::new("DELIVERED", "POST_RU: delivered", Some("Отделение"), Some("Вручено")),
        ],
        _ => vec![
            TrackStep::new("IN_TRANSIT", "Accepted", Some("Emulator"), Some("Accepted")),
            TrackStep::new("DELIVERED", "Delivered", Some("Emulator"), Some("Delivered")),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_carriers_have_three_steps() {
        for carrier in ["CDEK", "POST_RU"] {
            let steps = default_steps_for(carrier);
            assert_eq!(steps.len(), 3);
            assert!(steps[0].status_raw.starts_with(carrier));
            assert_eq!(steps[2].status, "DELIVERED");
        }
    }

    #[test]
    fn test_unknown_carrier_falls_back_to_generic() {
        let steps = default_steps_for("DHL");
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].status_raw, "Accepted");
        assert_eq!(steps[1].location.as_deref(), Some("Emulator"));
    }

    #[test]
    fn test_carrier_match_is_case_sensitive() {
        assert_eq!(default_steps_for("cdek").len(), 2);
    }
}
