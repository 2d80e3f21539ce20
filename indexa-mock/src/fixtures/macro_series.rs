use indexa_core::Series;

use super::compounded;

/// Periodic fixtures keyed by provider code.
pub fn by_code(code: &str) -> Option<Series> {
    match code {
        // Consumer price index, 2003 = 100.
        "TP.FE.OKTG01" => Some(compounded(code, 319.6, |y| match y {
            2018 => 1.5,
            2019 => 0.95,
            2020 => 1.1,
            2021 => 1.5,
            2022 => 4.6,
            2023 => 3.8,
            2024 => 3.0,
            _ => 2.3,
        })),
        // Local units per US dollar.
        "TP.DK.USD.S.YTL" => Some(compounded(code, 3.77, |y| match y {
            2018 => 2.8,
            2019 => 0.6,
            2020 => 2.0,
            2021 => 4.0,
            2022 => 3.0,
            2023 => 4.1,
            2024 => 1.4,
            _ => 1.6,
        })),
        // Real effective exchange rate, CPI based.
        "TP.RK.T1.Y" => Some(compounded(code, 88.4, |y| match y {
            2018 => -1.0,
            2019 => 0.3,
            2020 => -0.9,
            2021 => -1.6,
            2022 => 0.4,
            2023 => 0.8,
            _ => 0.5,
        })),
        // US consumer price index, also served as a periodic series.
        "CPIAUCSL" => Some(super::observations::cpiaucsl()),
        _ => None,
    }
}
