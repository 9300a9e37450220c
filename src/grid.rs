//! Beat/frame conversion on a tempo grid.
//!
//! Frames-per-beat is kept as an exact rational `fpb_n / fpb_d` so grid lines
//! never drift, no matter how far they are from the origin.

use serde::{Deserialize, Serialize};

use crate::constants::ONE_MINUTE_TEMPO;

/// Tempo and time-signature data reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoInfo {
    /// Frame rate as `video_rate / video_scale` frames per second.
    pub video_rate: i32,
    pub video_scale: i32,
    /// Tempo in BPM scaled by [`crate::constants::TEMPO_SCALE`].
    pub tempo: i32,
    pub beats_per_measure: i32,
    /// Frame of the first grid line (0-based).
    pub origin: i32,
}

impl Default for TempoInfo {
    fn default() -> Self {
        Self {
            video_rate: 30,
            video_scale: 1,
            tempo: 120 * crate::constants::TEMPO_SCALE as i32,
            beats_per_measure: 4,
            origin: 0,
        }
    }
}

/// How many beats one grid step spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeatDivision {
    /// `numer / denom` beats per step, e.g. `1 / 4` for quarter beats.
    Fraction { numer: i32, denom: i32 },
    /// Whole measures per step.
    Measures(i32),
}

impl BeatDivision {
    pub const BEAT: BeatDivision = BeatDivision::Fraction { numer: 1, denom: 1 };

    /// Beats per step as a `(numer, denom)` pair.
    pub fn as_fraction(self, beats_per_measure: i32) -> (i32, i32) {
        match self {
            BeatDivision::Fraction { numer, denom } => (numer, denom),
            BeatDivision::Measures(n) => (n.saturating_mul(beats_per_measure), 1),
        }
    }
}

/// A valid grid. Construct with [`BpmGrid::new`], which refuses degenerate input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BpmGrid {
    fpb_n: i64,
    fpb_d: i64,
    origin: i64,
}

impl BpmGrid {
    /// Builds the grid, or `None` when frame rate, scale, tempo or the
    /// division are non-positive.
    pub fn new(tempo: &TempoInfo, division: BeatDivision) -> Option<Self> {
        let (numer, denom) = division.as_fraction(tempo.beats_per_measure);
        if tempo.video_rate <= 0 || tempo.video_scale <= 0 || tempo.tempo <= 0 {
            return None;
        }
        if numer <= 0 || denom <= 0 {
            return None;
        }

        let fpb_n = tempo.video_rate as i64 * ONE_MINUTE_TEMPO * numer as i64;
        let fpb_d = tempo.video_scale as i64 * tempo.tempo as i64 * denom as i64;
        Some(Self {
            fpb_n,
            fpb_d,
            origin: tempo.origin as i64,
        })
    }

    /// Frames per step as `(numerator, denominator)`.
    pub fn frames_per_step(&self) -> (i64, i64) {
        (self.fpb_n, self.fpb_d)
    }

    pub fn origin(&self) -> i32 {
        self.origin as i32
    }

    /// Greatest step index whose grid line lies at or left of `frame`.
    ///
    /// Offsets left of the origin round toward more-negative steps, so
    /// `frame == origin - 1` is always step `-1`.
    pub fn beat_from_pos(&self, frame: i32) -> i64 {
        let p = frame as i128 - self.origin as i128;
        let (n, d) = (self.fpb_n as i128, self.fpb_d as i128);
        let beat = if p < 0 { -1 - (-1 - p) * d / n } else { p * d / n };
        beat as i64
    }

    /// Frame of the grid line for `beat`, rounded away from zero.
    pub fn pos_from_beat(&self, beat: i64) -> i32 {
        let num = beat as i128 * self.fpb_n as i128;
        let offset = div_away_from_zero(num, self.fpb_d as i128);
        (offset + self.origin as i128).clamp(i32::MIN as i128, i32::MAX as i128) as i32
    }

    /// Grid lines enclosing `frame`: `(left, right)` with `left <= frame < right`.
    pub fn lines_around(&self, frame: i32) -> (i32, i32) {
        let beat = self.beat_from_pos(frame);
        (self.pos_from_beat(beat), self.pos_from_beat(beat + 1))
    }
}

#[inline]
fn div_away_from_zero(num: i128, den: i128) -> i128 {
    if num > 0 {
        (num + (den - 1)) / den
    } else {
        (num - (den - 1)) / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TEMPO_SCALE;

    fn tempo(rate: i32, scale: i32, bpm: i32, origin: i32) -> TempoInfo {
        TempoInfo {
            video_rate: rate,
            video_scale: scale,
            tempo: bpm * TEMPO_SCALE as i32,
            beats_per_measure: 4,
            origin,
        }
    }

    #[test]
    fn quarter_beat_at_30fps_120bpm() {
        let grid = BpmGrid::new(
            &tempo(30, 1, 120, 0),
            BeatDivision::Fraction { numer: 1, denom: 4 },
        )
        .unwrap();
        assert_eq!(grid.beat_from_pos(0), 0);
        assert_eq!(grid.beat_from_pos(-1), -1);
        assert!(grid.pos_from_beat(1) > grid.pos_from_beat(0));
        // 15 frames per beat, so a quarter beat is 3.75 frames
        assert_eq!(grid.pos_from_beat(1), 4);
        assert_eq!(grid.pos_from_beat(4), 15);
    }

    #[test]
    fn invalid_inputs_yield_no_grid() {
        assert!(BpmGrid::new(&tempo(0, 1, 120, 0), BeatDivision::BEAT).is_none());
        assert!(BpmGrid::new(&tempo(30, 0, 120, 0), BeatDivision::BEAT).is_none());
        assert!(BpmGrid::new(&tempo(30, 1, 0, 0), BeatDivision::BEAT).is_none());
        assert!(BpmGrid::new(&tempo(30, 1, -5, 0), BeatDivision::BEAT).is_none());
    }

    #[test]
    fn frames_are_covered_by_their_beat() {
        let tempos = [
            tempo(30, 1, 120, 0),
            tempo(30000, 1001, 97, 13),
            tempo(60, 1, 173, -40),
            tempo(24, 1, 300, 7),
        ];
        let divisions = [
            BeatDivision::BEAT,
            BeatDivision::Fraction { numer: 1, denom: 3 },
            BeatDivision::Fraction { numer: 1, denom: 16 },
            BeatDivision::Measures(2),
        ];
        for t in &tempos {
            for &div in &divisions {
                let grid = BpmGrid::new(t, div).unwrap();
                for f in -500..500 {
                    let b = grid.beat_from_pos(f);
                    assert!(grid.pos_from_beat(b) <= f, "{t:?} {div:?} f={f}");
                    assert!(f < grid.pos_from_beat(b + 1), "{t:?} {div:?} f={f}");
                }
            }
        }
    }

    #[test]
    fn beat_round_trip_when_steps_span_frames() {
        // Round trip holds whenever a step is at least one frame long.
        let grids = [
            BpmGrid::new(&tempo(30, 1, 120, 0), BeatDivision::BEAT).unwrap(),
            BpmGrid::new(&tempo(30000, 1001, 97, 13), BeatDivision::BEAT).unwrap(),
            BpmGrid::new(&tempo(60, 1, 173, -40), BeatDivision::Fraction { numer: 1, denom: 2 })
                .unwrap(),
            BpmGrid::new(&tempo(30, 1, 120, 5), BeatDivision::Measures(1)).unwrap(),
        ];
        for grid in &grids {
            for b in -200..200 {
                assert_eq!(grid.beat_from_pos(grid.pos_from_beat(b)), b, "{grid:?} b={b}");
            }
        }
    }

    #[test]
    fn negative_offsets_round_outward() {
        let grid = BpmGrid::new(&tempo(30, 1, 120, 100), BeatDivision::BEAT).unwrap();
        // 15 frames per beat starting at frame 100
        assert_eq!(grid.beat_from_pos(100), 0);
        assert_eq!(grid.beat_from_pos(99), -1);
        assert_eq!(grid.beat_from_pos(85), -1);
        assert_eq!(grid.beat_from_pos(84), -2);
        assert_eq!(grid.pos_from_beat(-1), 85);
        assert_eq!(grid.lines_around(90), (85, 100));
    }

    #[test]
    fn measures_use_time_signature() {
        let t = tempo(30, 1, 120, 0);
        let grid = BpmGrid::new(&t, BeatDivision::Measures(2)).unwrap();
        // two 4/4 measures at 15 frames per beat
        assert_eq!(grid.pos_from_beat(1), 120);
        assert_eq!(BeatDivision::Measures(3).as_fraction(4), (12, 1));
    }
}
