/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound; the game loop logs them.

use crate::domain::entity::PickupKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    BarrelJumped,
    BarrelSmashed,
    MonkeySmashed,
    MonkeyShot,
    WeaponPicked(PickupKind),
    Shot { ammo_left: u32 },
    BananaThrown,
    BossHit { health: u32 },
    LevelCleared { level: usize, time_bonus: u32 },
    GameWon,
    GameLost,
}
