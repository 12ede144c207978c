//! A ten-day, two-track experiment with four tanks.
//!
//! Control tanks are 1 and 2, treatment tanks 3 and 4. Every tank starts with
//! 20 live mussels. The treatment copper series has no row on
//! [`COPPER_GAP_DAY`]; alkalinity and hardness are sampled every third day.

use musselforge_core::{Covariate, MergedRecord, MortalityRecord, Observations, Track};

pub const LAST_DAY: u32 = 9;
pub const COPPER_GAP_DAY: u32 = 4;
pub const START_COUNT: f64 = 20.0;

pub fn copper(track: Track, day: u32) -> Option<f64> {
    match track {
        Track::Control => Some(0.002 + 0.0001 * day as f64),
        Track::Treatment if day == COPPER_GAP_DAY => None,
        Track::Treatment => Some(0.30 - 0.02 * day as f64),
    }
}

pub fn temperature(_track: Track, day: u32) -> f64 {
    14.0 + 0.2 * day as f64
}

pub fn ph(track: Track, day: u32) -> f64 {
    match track {
        Track::Control => 8.1,
        Track::Treatment => 7.9 - 0.01 * day as f64,
    }
}

pub fn dissolved_oxygen(track: Track, day: u32) -> f64 {
    match track {
        Track::Control => 9.0 + 0.05 * day as f64,
        Track::Treatment => 8.5,
    }
}

fn tanks(track: Track) -> [u32; 2] {
    match track {
        Track::Control => [1, 2],
        Track::Treatment => [3, 4],
    }
}

/// Deaths recorded in `tank` on `day`.
pub fn deaths(track: Track, tank: u32, day: u32) -> f64 {
    match track {
        Track::Control if day % 4 == 3 || (tank == 2 && day == 6) => 1.0,
        Track::Control => 0.0,
        Track::Treatment if day == 0 => 0.0,
        Track::Treatment if tank == 3 => 2.0,
        Track::Treatment => 1.0 + (day % 2) as f64,
    }
}

fn mortality_rows(track: Track) -> Vec<MortalityRecord> {
    let mut rows = Vec::new();
    for tank in tanks(track) {
        let mut alive = START_COUNT;
        for day in 0..=LAST_DAY {
            let dead = deaths(track, tank, day).min(alive);
            alive -= dead;
            rows.push(MortalityRecord {
                tank,
                day,
                treatment: track,
                alive: Some(alive),
                dead: Some(dead),
            });
        }
    }
    rows
}

/// The full experiment as an observation store.
pub fn experiment() -> Observations {
    let mut obs = Observations::new();
    for track in Track::ALL {
        for day in 0..=LAST_DAY {
            if let Some(cu) = copper(track, day) {
                obs.insert(Covariate::Copper, track, day, cu);
            }
            obs.insert(Covariate::Temperature, track, day, temperature(track, day));
            obs.insert(Covariate::Ph, track, day, ph(track, day));
            obs.insert(
                Covariate::DissolvedOxygen,
                track,
                day,
                dissolved_oxygen(track, day),
            );
            let conductance = match track {
                Track::Control => 250.0,
                Track::Treatment => 260.0,
            };
            obs.insert(Covariate::SpecificConductance, track, day, conductance);
            if day % 3 == 0 {
                obs.insert(Covariate::Alkalinity, track, day, 120.0 + day as f64);
                obs.insert(Covariate::Hardness, track, day, 150.0 + day as f64);
            }
        }
        for record in mortality_rows(track) {
            obs.push_mortality(record);
        }
    }
    for length in [18.0, 20.0, 22.0] {
        obs.push_length(length);
    }
    obs
}

/// Mortality rows joined with same-day chemistry means.
pub fn merged_records() -> Vec<MergedRecord> {
    experiment().merged_records()
}
