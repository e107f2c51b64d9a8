pub const DEFAULT_TICK_SECS: f64 = 0.3;
pub const MIN_TICK_SECS: f64 = 0.1;
pub const MAX_TICK_SECS: f64 = 1.0;

pub const ANIMATION_MS: u64 = 100;
pub const MOUTH_FRAMES: u8 = 3;

pub const GHOST_COLORS: usize = 4;
pub const GHOST_COLOR_NAMES: [&str; GHOST_COLORS] = ["green", "orange", "pink", "red"];

pub const LEVEL_EXTENSION: &str = "txt";
pub const DEFAULT_LEVELS_DIR: &str = "levels";

pub const ENV_SPEED: &str = "MAZE_CHASE_SPEED";
pub const ENV_LEVELS_DIR: &str = "MAZE_CHASE_LEVELS_DIR";
pub const ENV_SEED: &str = "MAZE_CHASE_SEED";

pub fn ghost_color_name(color: usize) -> &'static str {
    GHOST_COLOR_NAMES[color % GHOST_COLORS]
}

pub fn next_mouth_frame(frame: u8) -> u8 {
    (frame % MOUTH_FRAMES) + 1
}
