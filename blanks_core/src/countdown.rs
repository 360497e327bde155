use crate::{
    game_state::GameState,
    store::{Change, Singleton},
};

/// Countdown values below this are announced as "ending soon".
pub const ENDING_SOON: u32 = 11;

/// Local one-second ticking between server countdown updates. The server's
/// value always replaces the local one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTimer {
    active: bool,
}

impl CountdownTimer {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn arm(&mut self, game: &mut Singleton<GameState>, remaining: Option<u32>) -> Option<Change<GameState>> {
        self.active = remaining.map_or(false, |n| n > 0);
        game.modify(|g| g.countdown = remaining)
    }

    pub fn tick(&mut self, game: &mut Singleton<GameState>) -> Option<Change<GameState>> {
        if !self.active {
            return None;
        }
        match game.get().countdown {
            Some(n) if n >= 1 => {
                if n == 1 {
                    self.active = false;
                }
                game.modify(|g| g.countdown = Some(n - 1))
            }
            _ => {
                self.active = false;
                None
            }
        }
    }
}

pub fn ending_soon(countdown: Option<u32>) -> Option<u32> {
    countdown.filter(|&n| n > 0 && n < ENDING_SOON)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countdown(game: &Singleton<GameState>) -> Option<u32> {
        game.get().countdown
    }

    #[test]
    fn ticks_should_run_down_to_zero_and_stop() {
        let mut game = Singleton::new("game", GameState::default());
        let mut timer = CountdownTimer::default();
        timer.arm(&mut game, Some(5));

        for expected in (0..5).rev() {
            assert!(timer.is_active());
            timer.tick(&mut game);
            assert_eq!(countdown(&game), Some(expected));
        }
        assert!(!timer.is_active());
        assert_eq!(timer.tick(&mut game), None);
        assert_eq!(countdown(&game), Some(0));

        timer.arm(&mut game, Some(8));
        assert!(timer.is_active());
        timer.tick(&mut game);
        assert_eq!(countdown(&game), Some(7));
    }

    #[test]
    fn arming_with_nothing_should_stop_ticking() {
        let mut game = Singleton::new("game", GameState::default());
        let mut timer = CountdownTimer::default();
        timer.arm(&mut game, Some(30));
        timer.arm(&mut game, None);

        assert!(!timer.is_active());
        assert_eq!(timer.tick(&mut game), None);
        assert_eq!(countdown(&game), None);
    }

    #[test]
    fn server_value_should_replace_local_value() {
        let mut game = Singleton::new("game", GameState::default());
        let mut timer = CountdownTimer::default();
        timer.arm(&mut game, Some(20));
        timer.tick(&mut game);
        timer.tick(&mut game);
        timer.arm(&mut game, Some(25));

        assert_eq!(countdown(&game), Some(25));
    }

    #[test]
    fn ending_soon_should_only_cover_one_to_ten() {
        assert_eq!(ending_soon(Some(11)), None);
        assert_eq!(ending_soon(Some(10)), Some(10));
        assert_eq!(ending_soon(Some(1)), Some(1));
        assert_eq!(ending_soon(Some(0)), None);
        assert_eq!(ending_soon(None), None);
    }
}
