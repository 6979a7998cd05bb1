/// Eco score out of 100, penalizing high average and top speed.
pub fn eco_score(avg_speed_kmh: f64, max_speed_kmh: f64) -> u8 {
    let speed_penalty = if avg_speed_kmh > 100.0 {
        30
    } else if avg_speed_kmh > 80.0 {
        20
    } else if avg_speed_kmh > 60.0 {
        10
    } else {
        0
    };

    let max_speed_penalty = if max_speed_kmh > 130.0 {
        20
    } else if max_speed_kmh > 110.0 {
        10
    } else {
        0
    };

    (100i32 - speed_penalty - max_speed_penalty).clamp(0, 100) as u8
}
