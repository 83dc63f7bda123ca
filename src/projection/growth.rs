/// Whole years between now and the target, floored at zero.
pub fn elapsed_years(current_year: i32, target_year: i32) -> u32 {
    target_year.saturating_sub(current_year).max(0) as u32
}

/// Yearly compounding factor for a percentage rate (6 -> 1.06).
pub fn growth_factor(annual_rate: f64) -> f64 {
    1.0 + annual_rate / 100.0
}

/// `base * (1 + rate/100)^elapsed`, computed directly, never chained.
pub fn compound(base_value: f64, annual_rate: f64, elapsed: u32) -> f64 {
    if elapsed == 0 {
        return base_value;
    }
    base_value * growth_factor(annual_rate).powf(elapsed as f64)
}

pub fn future_value(base_value: f64, annual_rate: f64, current_year: i32, target_year: i32) -> f64 {
    compound(base_value, annual_rate, elapsed_years(current_year, target_year))
}
