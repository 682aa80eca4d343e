const FADE_IN_END: f32 = 0.10;
const HOLD_END: f32 = 0.60;

pub fn opacity(age: f32, lifetime: f32) -> f32 {
    if lifetime <= 0.0 {
        return 0.0;
    }

    let t = age / lifetime;
    if !(0.0..=1.0).contains(&t) {
        0.0
    } else if t < FADE_IN_END {
        t / FADE_IN_END
    } else if t < HOLD_END {
        1.0
    } else {
        1.0 - (t - HOLD_END) / (1.0 - HOLD_END)
    }
}
