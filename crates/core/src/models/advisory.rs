//! Rule-based planting/harvest advice from a short forecast.
//!
//! Missing `pop` counts as 0 for the planting check but as 100 for the dry-pair scan, and
//! missing `tempMax` counts as 0. Both defaults are kept for compatibility with existing
//! clients.

use crate::domain::advisory::{Advisory, AdvisoryAction, AdvisoryIcon, ForecastEntry};
use crate::time::dates::weekday_name;

const PLANT_WINDOW_DAYS: usize = 3;
const PLANT_MIN_POP: f64 = 60.0;
const PLANT_MAX_TEMP_C: f64 = 30.0;

const HARVEST_WINDOW_DAYS: usize = 2;
const HARVEST_BLOCK_POP: f64 = 50.0;
const DRY_DAY_MAX_POP: f64 = 40.0;

fn advisory(
    action: AdvisoryAction,
    en: impl Into<String>,
    sw: impl Into<String>,
    icon: AdvisoryIcon,
) -> Advisory {
    Advisory {
        action,
        text_en: en.into(),
        text_sw: sw.into(),
        icon,
    }
}

/// `forecast` is chronological, soonest first.
pub fn advise_from_forecast(forecast: &[ForecastEntry]) -> Advisory {
    if forecast.is_empty() {
        return advisory(
            AdvisoryAction::Watch,
            "Keep watching the weather. No update available.",
            "Endelea kufuatilia hali ya hewa. Hakuna taarifa kwa sasa.",
            AdvisoryIcon::Eye,
        );
    }

    let next_days = &forecast[..forecast.len().min(PLANT_WINDOW_DAYS)];
    let wet_enough = next_days
        .iter()
        .all(|day| day.pop.unwrap_or(0.0) >= PLANT_MIN_POP);
    let cool_enough = next_days
        .iter()
        .all(|day| day.temp_max.unwrap_or(0.0) <= PLANT_MAX_TEMP_C);

    if wet_enough && cool_enough {
        return advisory(
            AdvisoryAction::Plant,
            "Good to plant next 3 days. Light rain is coming.",
            "Ni vizuri kupanda siku 3 zijazo. Mvua nyepesi inakuja.",
            AdvisoryIcon::Seedling,
        );
    }

    let harvest_block = forecast
        .iter()
        .take(HARVEST_WINDOW_DAYS)
        .any(|day| day.pop.unwrap_or(0.0) >= HARVEST_BLOCK_POP);

    if harvest_block {
        let is_dry = |day: &ForecastEntry| day.pop.unwrap_or(100.0) < DRY_DAY_MAX_POP;
        let dry_spell = forecast
            .windows(2)
            .find(|pair| is_dry(&pair[0]) && is_dry(&pair[1]));

        if let Some(pair) = dry_spell {
            let target = weekday_name(pair[0].date);
            return advisory(
                AdvisoryAction::Wait,
                format!("Hold harvest. Try from {target} when skies clear."),
                format!("Subiri kuvuna. Anza {target} wakati anga itatulia."),
                AdvisoryIcon::Umbrella,
            );
        }

        return advisory(
            AdvisoryAction::Wait,
            "Wait to harvest. Rain likely soon.",
            "Subiri kuvuna. Mvua inatarajiwa karibuni.",
            AdvisoryIcon::Umbrella,
        );
    }

    advisory(
        AdvisoryAction::Watch,
        "No major weather alerts. Keep daily checks.",
        "Hakuna tahadhari kubwa. Endelea kukagua kila siku.",
        AdvisoryIcon::Eye,
    )
}
