//! Playable games and their rule presets
//!
//! Each preset reproduces one cabinet game as a rule table: screen size,
//! tick period, control scheme, fire rule, collision pairs and point values.
//! Randomly scattered layouts use a fixed layout seed so presets are stable.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH, SQUARE_SCREEN};
use crate::sim::{
    CollisionRule, ControlScheme, Edge, EdgePolicy, EntityGroup, EntitySpec, FireDirection,
    FireRule, GameRules, GoalRule, GroupRules, HitEffect, PointTable, Seek, SpawnEdge, SpawnerRule,
    Threshold, WorldBounds,
};

/// Seed for preset layouts that scatter entities
const LAYOUT_SEED: u64 = 0x00C0_FFEE;

/// Galaga enemy kinds (point table keys)
pub const GALAGA_BOSS: u32 = 1;
pub const GALAGA_BEE: u32 = 0;
/// Centipede target kinds
pub const CENTIPEDE_SEGMENT: u32 = 1;
pub const CENTIPEDE_MUSHROOM: u32 = 0;
/// One life per city
const MISSILE_COMMAND_CITIES: u32 = 6;
/// Paperboy house kinds
pub const PAPERBOY_SUBSCRIBER: u32 = 1;
pub const PAPERBOY_NON_SUBSCRIBER: u32 = 0;

/// Games the cabinet can start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameId {
    Asteroids,
    Galaga,
    SpaceInvaders,
    Centipede,
    Defender,
    Joust,
    Paperboy,
    MissileCommand,
    BubbleBobble,
    Robotron,
    Frogger,
    DonkeyKong,
    Pitfall,
}

impl GameId {
    pub const ALL: [GameId; 13] = [
        GameId::Asteroids,
        GameId::Galaga,
        GameId::SpaceInvaders,
        GameId::Centipede,
        GameId::Defender,
        GameId::Joust,
        GameId::Paperboy,
        GameId::MissileCommand,
        GameId::BubbleBobble,
        GameId::Robotron,
        GameId::Frogger,
        GameId::DonkeyKong,
        GameId::Pitfall,
    ];

    /// Marquee title
    pub fn title(&self) -> &'static str {
        match self {
            GameId::Asteroids => "ASTEROIDS",
            GameId::Galaga => "GALAGA",
            GameId::SpaceInvaders => "SPACE INVADERS",
            GameId::Centipede => "CENTIPEDE",
            GameId::Defender => "DEFENDER",
            GameId::Joust => "JOUST",
            GameId::Paperboy => "PAPERBOY",
            GameId::MissileCommand => "MISSILE COMMAND",
            GameId::BubbleBobble => "BUBBLE BOBBLE",
            GameId::Robotron => "ROBOTRON",
            GameId::Frogger => "FROGGER",
            GameId::DonkeyKong => "DONKEY KONG",
            GameId::Pitfall => "PITFALL",
        }
    }

    /// Case-insensitive title lookup; also accepts titles without spaces
    pub fn from_title(title: &str) -> Option<Self> {
        let wanted: String = title
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_uppercase();
        GameId::ALL.into_iter().find(|id| {
            id.title()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                == wanted
        })
    }

    /// Build this game's rule table
    pub fn rules(&self) -> GameRules {
        match self {
            GameId::Asteroids => asteroids(),
            GameId::Galaga => galaga(),
            GameId::SpaceInvaders => space_invaders(),
            GameId::Centipede => centipede(),
            GameId::Defender => defender(),
            GameId::Joust => joust(),
            GameId::Paperboy => paperboy(),
            GameId::MissileCommand => missile_command(),
            GameId::BubbleBobble => bubble_bobble(),
            GameId::Robotron => robotron(),
            GameId::Frogger => frogger(),
            GameId::DonkeyKong => donkey_kong(),
            GameId::Pitfall => pitfall(),
        }
    }
}

fn lethal() -> GroupRules {
    GroupRules {
        edge_policy: Some(EdgePolicy::Lethal),
        ..Default::default()
    }
}

fn shoot(
    first: EntityGroup,
    second: EntityGroup,
    threshold: Threshold,
    table: PointTable,
) -> CollisionRule {
    CollisionRule {
        first,
        second,
        threshold,
        consume_first: true,
        consume_second: true,
        effect: HitEffect::Score(table),
    }
}

fn player_hit(second: EntityGroup, threshold: Threshold, consume_second: bool) -> CollisionRule {
    CollisionRule {
        first: EntityGroup::Player,
        second,
        threshold,
        consume_first: false,
        consume_second,
        effect: HitEffect::LoseLife,
    }
}

/// Wrapping field, thrust ship, rocks split into smaller rocks
fn asteroids() -> GameRules {
    let world = WorldBounds::new(SQUARE_SCREEN, SQUARE_SCREEN, EdgePolicy::Wrap);
    let mut rng = Pcg32::seed_from_u64(LAYOUT_SEED);

    let mut rules = GameRules::new("ASTEROIDS", world, 16)
        .with_control(ControlScheme::Thrust {
            turn_rate: 5f32.to_radians(),
            thrust: 0.3,
        })
        .with_fire(FireRule {
            direction: FireDirection::Heading { speed: 8.0 },
            radius: 0.0,
            ttl: Some(60),
            cooldown: 0,
            auto_fire: false,
            offset: (0.0, 0.0),
        })
        .with_group(
            EntityGroup::Player,
            GroupRules {
                friction: 0.99,
                ..Default::default()
            },
        )
        .with_group(
            EntityGroup::Hazard,
            GroupRules {
                refill_when_cleared: true,
                ..Default::default()
            },
        )
        .with_collision(CollisionRule {
            first: EntityGroup::Bullet,
            second: EntityGroup::Hazard,
            threshold: Threshold::RadiusSum,
            consume_first: true,
            consume_second: true,
            effect: HitEffect::Split {
                points_per_step: 20,
                max_tag: 3,
                children: 2,
                speed: 3.0,
                radius_per_tag: 10.0,
            },
        })
        .with_collision(player_hit(EntityGroup::Hazard, Threshold::RadiusSum, false))
        .spawn(EntityGroup::Player, EntitySpec::at(200.0, 200.0, 0.0));

    for _ in 0..5 {
        let mut x: f32 = rng.random_range(0.0..SQUARE_SCREEN);
        let y: f32 = rng.random_range(0.0..SQUARE_SCREEN);
        // Keep the ship's spawn point clear
        if (x - 200.0).hypot(y - 200.0) < 80.0 {
            x = (x + 200.0) % SQUARE_SCREEN;
        }
        let spec = EntitySpec::at(x, y, 30.0)
            .with_vel(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
            .with_tag(3);
        rules = rules.spawn(EntityGroup::Hazard, spec);
    }
    rules
}

/// 4x8 formation, bosses in the top rows are worth more
fn galaga() -> GameRules {
    let world = WorldBounds::new(SCREEN_WIDTH, 500.0, EdgePolicy::Clip);
    let mut rules = GameRules::new("GALAGA", world, 50)
        .with_control(ControlScheme::Strafe {
            speed: 8.0,
            vertical: false,
        })
        .with_fire(FireRule {
            direction: FireDirection::Fixed { vx: 0.0, vy: -8.0 },
            radius: 2.0,
            ttl: None,
            cooldown: 0,
            auto_fire: false,
            offset: (0.0, -20.0),
        })
        .with_group(EntityGroup::Bullet, lethal())
        .with_group(
            EntityGroup::Enemy,
            GroupRules {
                refill_when_cleared: true,
                ..Default::default()
            },
        )
        .with_collision(shoot(
            EntityGroup::Bullet,
            EntityGroup::Enemy,
            Threshold::Fixed(20.0),
            PointTable::ByTag {
                entries: vec![(GALAGA_BOSS, 50), (GALAGA_BEE, 30)],
                default: 30,
            },
        ))
        .with_collision(player_hit(EntityGroup::Enemy, Threshold::Fixed(20.0), true))
        .spawn(EntityGroup::Player, EntitySpec::at(200.0, 460.0, 0.0));

    for row in 0..4 {
        for col in 0..8 {
            let kind = if row < 2 { GALAGA_BOSS } else { GALAGA_BEE };
            let spec = EntitySpec::at(col as f32 * 45.0 + 50.0, row as f32 * 40.0 + 50.0, 10.0)
                .with_vel(0.0, 0.2)
                .with_tag(kind);
            rules = rules.spawn(EntityGroup::Enemy, spec);
        }
    }
    rules
}

/// 5x10 invaders; one landing on the base ends the run
fn space_invaders() -> GameRules {
    let world = WorldBounds::new(SCREEN_WIDTH, 400.0, EdgePolicy::Clip);
    let mut rules = GameRules::new("SPACE INVADERS", world, 100)
        .with_lives(1)
        .with_control(ControlScheme::Strafe {
            speed: 10.0,
            vertical: false,
        })
        .with_fire(FireRule {
            direction: FireDirection::Fixed { vx: 0.0, vy: -5.0 },
            radius: 2.0,
            ttl: None,
            cooldown: 0,
            auto_fire: false,
            offset: (0.0, 0.0),
        })
        .with_group(EntityGroup::Bullet, lethal())
        .with_group(
            EntityGroup::Enemy,
            GroupRules {
                edge_policy: Some(EdgePolicy::Lethal),
                escape_costs_life: true,
                ..Default::default()
            },
        )
        .with_group(EntityGroup::Hazard, lethal())
        .with_spawner(SpawnerRule {
            group: EntityGroup::Hazard,
            period_ticks: 10,
            chance: 0.5,
            edge: SpawnEdge::Side(Edge::Top),
            template: EntitySpec::at(0.0, 0.0, 3.0).with_vel(0.0, 3.0),
        })
        .with_collision(shoot(
            EntityGroup::Bullet,
            EntityGroup::Enemy,
            Threshold::Fixed(15.0),
            PointTable::Flat(10),
        ))
        .with_collision(player_hit(EntityGroup::Hazard, Threshold::Fixed(15.0), true))
        .with_collision(player_hit(EntityGroup::Enemy, Threshold::Fixed(15.0), true))
        .spawn(EntityGroup::Player, EntitySpec::at(200.0, 320.0, 0.0));

    for row in 0..5 {
        for col in 0..10 {
            let spec = EntitySpec::at(col as f32 * 35.0 + 50.0, row as f32 * 30.0 + 50.0, 10.0)
                .with_vel(0.0, 0.1);
            rules = rules.spawn(EntityGroup::Enemy, spec);
        }
    }
    rules
}

/// Segments are worth 10, mushrooms 1
fn centipede() -> GameRules {
    let world = WorldBounds::new(SCREEN_WIDTH, 500.0, EdgePolicy::Clip);
    let mut rng = Pcg32::seed_from_u64(LAYOUT_SEED);

    let mut rules = GameRules::new("CENTIPEDE", world, 100)
        .with_control(ControlScheme::Strafe {
            speed: 5.0,
            vertical: true,
        })
        .with_fire(FireRule {
            direction: FireDirection::Fixed { vx: 0.0, vy: -10.0 },
            radius: 2.0,
            ttl: None,
            cooldown: 0,
            auto_fire: false,
            offset: (10.0, 0.0),
        })
        .with_group(EntityGroup::Bullet, lethal())
        .with_group(
            EntityGroup::Enemy,
            GroupRules {
                edge_policy: Some(EdgePolicy::Wrap),
                refill_when_cleared: true,
                ..Default::default()
            },
        )
        .with_collision(shoot(
            EntityGroup::Bullet,
            EntityGroup::Enemy,
            Threshold::Fixed(15.0),
            PointTable::ByTag {
                entries: vec![(CENTIPEDE_SEGMENT, 10), (CENTIPEDE_MUSHROOM, 1)],
                default: 0,
            },
        ))
        .with_collision(player_hit(EntityGroup::Enemy, Threshold::Fixed(15.0), true))
        .spawn(EntityGroup::Player, EntitySpec::at(200.0, 450.0, 0.0));

    for i in 0..10 {
        let spec = EntitySpec::at(i as f32 * 20.0, 50.0, 8.0)
            .with_vel(2.0, 0.0)
            .with_tag(CENTIPEDE_SEGMENT);
        rules = rules.spawn(EntityGroup::Enemy, spec);
    }
    for _ in 0..30 {
        let spec = EntitySpec::at(
            rng.random_range::<f32, _>(0.0..SCREEN_WIDTH - 20.0).floor(),
            rng.random_range::<f32, _>(100.0..400.0).floor(),
            8.0,
        )
        .with_tag(CENTIPEDE_MUSHROOM);
        rules = rules.spawn(EntityGroup::Enemy, spec);
    }
    rules
}

/// Side-scrolling shooter: fire right, landers drift left
fn defender() -> GameRules {
    let world = WorldBounds::new(SCREEN_WIDTH, SCREEN_HEIGHT, EdgePolicy::Clip);
    let mut rng = Pcg32::seed_from_u64(LAYOUT_SEED);

    let mut rules = GameRules::new("DEFENDER", world, 50)
        .with_control(ControlScheme::Strafe {
            speed: 5.0,
            vertical: true,
        })
        .with_fire(FireRule {
            direction: FireDirection::Fixed { vx: 8.0, vy: 0.0 },
            radius: 2.0,
            ttl: None,
            cooldown: 0,
            auto_fire: false,
            offset: (15.0, 10.0),
        })
        .with_group(EntityGroup::Bullet, lethal())
        .with_group(
            EntityGroup::Enemy,
            GroupRules {
                edge_policy: Some(EdgePolicy::Wrap),
                refill_when_cleared: true,
                ..Default::default()
            },
        )
        .with_collision(shoot(
            EntityGroup::Bullet,
            EntityGroup::Enemy,
            Threshold::Fixed(20.0),
            PointTable::Flat(150),
        ))
        .with_collision(player_hit(EntityGroup::Enemy, Threshold::Fixed(20.0), true))
        .spawn(EntityGroup::Player, EntitySpec::at(50.0, 150.0, 0.0));

    for _ in 0..5 {
        let spec = EntitySpec::at(
            rng.random_range(0.0..SCREEN_WIDTH),
            rng.random_range(50.0..150.0),
            10.0,
        )
        .with_vel(-1.0, 0.0);
        rules = rules.spawn(EntityGroup::Enemy, spec);
    }
    for i in 0..8 {
        let spec = EntitySpec::at(i as f32 * 50.0 + 25.0, SCREEN_HEIGHT - 30.0, 10.0);
        rules = rules.spawn(EntityGroup::Pickup, spec);
    }
    rules
}

/// Flap against gravity; the higher rider wins a clash
fn joust() -> GameRules {
    let world = WorldBounds::new(SCREEN_WIDTH, SCREEN_HEIGHT, EdgePolicy::Clip);
    let falling = GroupRules {
        gravity: 0.5,
        ..Default::default()
    };
    GameRules::new("JOUST", world, 50)
        .with_control(ControlScheme::Flap {
            speed: 3.0,
            impulse: 8.0,
        })
        .with_group(EntityGroup::Player, falling)
        .with_group(
            EntityGroup::Enemy,
            GroupRules {
                refill_when_cleared: true,
                ..falling
            },
        )
        .with_collision(CollisionRule {
            first: EntityGroup::Player,
            second: EntityGroup::Enemy,
            threshold: Threshold::Fixed(30.0),
            consume_first: false,
            consume_second: false,
            effect: HitEffect::Stomp { points: 500 },
        })
        .spawn(EntityGroup::Player, EntitySpec::at(100.0, 200.0, 15.0))
        .spawn(EntityGroup::Enemy, EntitySpec::at(300.0, 180.0, 15.0))
        .spawn(EntityGroup::Enemy, EntitySpec::at(200.0, 130.0, 15.0))
}

/// Papers arc under gravity; subscribers pay, non-subscribers cost
fn paperboy() -> GameRules {
    let world = WorldBounds::new(SCREEN_WIDTH, SCREEN_HEIGHT, EdgePolicy::Clip);
    let mut rng = Pcg32::seed_from_u64(LAYOUT_SEED);

    let mut rules = GameRules::new("PAPERBOY", world, 50)
        .with_control(ControlScheme::Strafe {
            speed: 3.0,
            vertical: true,
        })
        .with_fire(FireRule {
            direction: FireDirection::Fixed { vx: 4.0, vy: -2.0 },
            radius: 3.0,
            ttl: None,
            cooldown: 0,
            auto_fire: false,
            offset: (15.0, 10.0),
        })
        .with_group(
            EntityGroup::Bullet,
            GroupRules {
                gravity: 0.2,
                ..lethal()
            },
        )
        .with_collision(shoot(
            EntityGroup::Bullet,
            EntityGroup::Pickup,
            Threshold::Fixed(30.0),
            PointTable::ByTag {
                entries: vec![(PAPERBOY_SUBSCRIBER, 250), (PAPERBOY_NON_SUBSCRIBER, -100)],
                default: 0,
            },
        ))
        .with_collision(player_hit(EntityGroup::Hazard, Threshold::Fixed(25.0), false))
        .spawn(EntityGroup::Player, EntitySpec::at(50.0, 200.0, 0.0));

    for i in 0..5 {
        let kind = if rng.random::<f32>() > 0.3 {
            PAPERBOY_SUBSCRIBER
        } else {
            PAPERBOY_NON_SUBSCRIBER
        };
        let spec = EntitySpec::at(i as f32 * 80.0 + 40.0, 150.0, 15.0).with_tag(kind);
        rules = rules.spawn(EntityGroup::Pickup, spec);
    }
    for _ in 0..4 {
        let spec = EntitySpec::at(
            rng.random_range(200.0..SCREEN_WIDTH),
            rng.random_range(220.0..270.0),
            10.0,
        )
        .with_vel(-1.0, 0.0);
        rules = rules.spawn(EntityGroup::Hazard, spec);
    }
    rules.with_group(
        EntityGroup::Hazard,
        GroupRules {
            edge_policy: Some(EdgePolicy::Wrap),
            ..Default::default()
        },
    )
}

/// Warheads home on the cities; each one that lands takes a city (a life)
fn missile_command() -> GameRules {
    let world = WorldBounds::new(SCREEN_WIDTH, SCREEN_HEIGHT, EdgePolicy::Clip);
    let mut rules = GameRules::new("MISSILE COMMAND", world, 50)
        .with_lives(MISSILE_COMMAND_CITIES)
        .with_control(ControlScheme::Strafe {
            speed: 6.0,
            vertical: false,
        })
        .with_fire(FireRule {
            direction: FireDirection::Fixed { vx: 0.0, vy: -6.0 },
            radius: 4.0,
            ttl: None,
            cooldown: 2,
            auto_fire: false,
            offset: (0.0, 0.0),
        })
        .with_group(EntityGroup::Bullet, lethal())
        .with_group(
            EntityGroup::Hazard,
            GroupRules {
                seek: Some(Seek {
                    target: EntityGroup::Pickup,
                    speed: 2.0,
                }),
                ..lethal()
            },
        )
        .with_spawner(SpawnerRule {
            group: EntityGroup::Hazard,
            // 2 s at 50 ms per tick
            period_ticks: 40,
            chance: 0.3,
            edge: SpawnEdge::Side(Edge::Top),
            template: EntitySpec::at(0.0, 0.0, 4.0).with_vel(0.0, 1.0),
        })
        .with_collision(shoot(
            EntityGroup::Bullet,
            EntityGroup::Hazard,
            Threshold::Fixed(20.0),
            PointTable::Flat(25),
        ))
        .with_collision(CollisionRule {
            first: EntityGroup::Hazard,
            second: EntityGroup::Pickup,
            threshold: Threshold::Fixed(15.0),
            consume_first: true,
            consume_second: true,
            effect: HitEffect::LoseLife,
        })
        .spawn(EntityGroup::Player, EntitySpec::at(200.0, 280.0, 0.0));

    for i in 0..MISSILE_COMMAND_CITIES {
        let city = EntitySpec::at(i as f32 * 60.0 + 40.0, SCREEN_HEIGHT - 40.0, 10.0);
        rules = rules.spawn(EntityGroup::Pickup, city);
    }
    rules
}

/// Trap enemies in arcing bubbles
fn bubble_bobble() -> GameRules {
    let world = WorldBounds::new(SCREEN_WIDTH, SCREEN_HEIGHT, EdgePolicy::Clip);
    GameRules::new("BUBBLE BOBBLE", world, 50)
        .with_control(ControlScheme::Flap {
            speed: 3.0,
            impulse: 8.0,
        })
        .with_fire(FireRule {
            direction: FireDirection::Fixed { vx: 3.0, vy: -2.0 },
            radius: 8.0,
            ttl: Some(100),
            cooldown: 4,
            auto_fire: false,
            offset: (15.0, 10.0),
        })
        .with_group(
            EntityGroup::Player,
            GroupRules {
                gravity: 0.5,
                ..Default::default()
            },
        )
        .with_group(
            EntityGroup::Bullet,
            GroupRules {
                gravity: 0.1,
                ..lethal()
            },
        )
        .with_group(
            EntityGroup::Enemy,
            GroupRules {
                refill_when_cleared: true,
                ..Default::default()
            },
        )
        .with_collision(shoot(
            EntityGroup::Bullet,
            EntityGroup::Enemy,
            Threshold::Fixed(25.0),
            PointTable::Flat(1000),
        ))
        .with_collision(player_hit(EntityGroup::Enemy, Threshold::Fixed(30.0), false))
        .spawn(EntityGroup::Player, EntitySpec::at(50.0, 250.0, 0.0))
        .spawn(EntityGroup::Enemy, EntitySpec::at(300.0, 200.0, 12.0))
        .spawn(EntityGroup::Enemy, EntitySpec::at(150.0, 120.0, 12.0))
        .spawn(EntityGroup::Enemy, EntitySpec::at(320.0, 80.0, 12.0))
}

/// Twin-stick arena: eight-way fire, robots close in, rescue the humans
fn robotron() -> GameRules {
    let world = WorldBounds::new(SCREEN_WIDTH, SCREEN_HEIGHT, EdgePolicy::Clip);
    let mut rng = Pcg32::seed_from_u64(LAYOUT_SEED);
    let spawn = EntitySpec::at(200.0, 150.0, 10.0);

    let mut rules = GameRules::new("ROBOTRON", world, 50)
        .with_control(ControlScheme::Strafe {
            speed: 3.0,
            vertical: true,
        })
        .with_fire(FireRule {
            direction: FireDirection::Spread {
                speed: 5.0,
                count: 8,
            },
            radius: 2.0,
            ttl: None,
            cooldown: 0,
            auto_fire: false,
            offset: (0.0, 0.0),
        })
        .with_group(EntityGroup::Bullet, lethal())
        .with_group(
            EntityGroup::Enemy,
            GroupRules {
                seek: Some(Seek {
                    target: EntityGroup::Player,
                    speed: 0.8,
                }),
                refill_when_cleared: true,
                ..Default::default()
            },
        )
        .with_collision(shoot(
            EntityGroup::Bullet,
            EntityGroup::Enemy,
            Threshold::Fixed(15.0),
            PointTable::Flat(50),
        ))
        .with_collision(CollisionRule {
            first: EntityGroup::Player,
            second: EntityGroup::Pickup,
            threshold: Threshold::Fixed(25.0),
            consume_first: false,
            consume_second: true,
            effect: HitEffect::Score(PointTable::Flat(1000)),
        })
        .with_collision(player_hit(EntityGroup::Enemy, Threshold::Fixed(15.0), true))
        .spawn(EntityGroup::Player, spawn);

    let scatter = |rng: &mut Pcg32| {
        let mut x: f32 = rng.random_range(20.0..SCREEN_WIDTH - 20.0);
        let y: f32 = rng.random_range(20.0..SCREEN_HEIGHT - 20.0);
        // Nothing starts on top of the player
        if (x - spawn.pos.x).hypot(y - spawn.pos.y) < 60.0 {
            x = (x + 150.0) % (SCREEN_WIDTH - 20.0);
        }
        (x, y)
    };
    for _ in 0..8 {
        let (x, y) = scatter(&mut rng);
        rules = rules.spawn(EntityGroup::Enemy, EntitySpec::at(x, y, 10.0));
    }
    for _ in 0..5 {
        let (x, y) = scatter(&mut rng);
        rules = rules.spawn(EntityGroup::Pickup, EntitySpec::at(x, y, 8.0));
    }
    rules
}

/// Cross five lanes of traffic; the far bank is worth 100 and a fresh start
fn frogger() -> GameRules {
    let world = WorldBounds::new(SCREEN_WIDTH, 500.0, EdgePolicy::Clip);
    let mut rng = Pcg32::seed_from_u64(LAYOUT_SEED);

    let mut rules = GameRules::new("FROGGER", world, 50)
        .with_control(ControlScheme::Strafe {
            speed: 5.0,
            vertical: true,
        })
        .with_group(
            EntityGroup::Hazard,
            GroupRules {
                edge_policy: Some(EdgePolicy::Wrap),
                ..Default::default()
            },
        )
        .with_collision(player_hit(EntityGroup::Hazard, Threshold::Fixed(20.0), false))
        .with_goal(GoalRule::Reach {
            group: EntityGroup::Player,
            edge: Edge::Top,
            depth: 50.0,
            points: 100,
        })
        .spawn(EntityGroup::Player, EntitySpec::at(200.0, 450.0, 12.0));

    for lane in 0..5 {
        let direction = if lane % 2 == 0 { 1.0 } else { -1.0 };
        for i in 0..3 {
            let speed: f32 = rng.random_range(2.0..4.0);
            let car = EntitySpec::at(i as f32 * 150.0, 350.0 - lane as f32 * 50.0, 15.0)
                .with_vel(speed * direction, 0.0);
            rules = rules.spawn(EntityGroup::Hazard, car);
        }
    }
    rules
}

/// Jump the barrels; every tick survived is a point
fn donkey_kong() -> GameRules {
    // Bottom girder is the floor
    let world = WorldBounds::new(SCREEN_WIDTH, 470.0, EdgePolicy::Clip);
    GameRules::new("DONKEY KONG", world, 50)
        .with_control(ControlScheme::Jump {
            speed: 5.0,
            impulse: 15.0,
        })
        .with_group(
            EntityGroup::Player,
            GroupRules {
                gravity: 1.0,
                ..Default::default()
            },
        )
        .with_group(EntityGroup::Hazard, lethal())
        .with_spawner(SpawnerRule {
            group: EntityGroup::Hazard,
            period_ticks: 1,
            chance: 0.02,
            edge: SpawnEdge::Template,
            template: EntitySpec::at(350.0, 50.0, 10.0).with_vel(-2.0, 1.0),
        })
        .with_collision(player_hit(EntityGroup::Hazard, Threshold::Fixed(20.0), true))
        .with_goal(GoalRule::Survive {
            period_ticks: 1,
            points: 1,
        })
        .spawn(EntityGroup::Player, EntitySpec::at(50.0, 470.0, 15.0))
}

/// Run the jungle: jump the pits, grab the treasure
fn pitfall() -> GameRules {
    // Two screens of jungle; the ground is the floor
    let world = WorldBounds::new(SCREEN_WIDTH * 2.0, 200.0, EdgePolicy::Clip);
    let mut rules = GameRules::new("PITFALL", world, 50)
        .with_control(ControlScheme::Jump {
            speed: 3.0,
            impulse: 12.0,
        })
        .with_group(
            EntityGroup::Player,
            GroupRules {
                gravity: 1.0,
                ..Default::default()
            },
        )
        .with_collision(CollisionRule {
            first: EntityGroup::Player,
            second: EntityGroup::Pickup,
            threshold: Threshold::Fixed(20.0),
            consume_first: false,
            consume_second: true,
            effect: HitEffect::Score(PointTable::Flat(2000)),
        })
        .with_collision(player_hit(EntityGroup::Hazard, Threshold::Fixed(20.0), false))
        .spawn(EntityGroup::Player, EntitySpec::at(50.0, 200.0, 10.0));

    // Pits are 50 wide, centred on the disc
    for x in [150.0, 450.0, 750.0] {
        rules = rules.spawn(EntityGroup::Hazard, EntitySpec::at(x + 25.0, 200.0, 25.0));
    }
    for (x, y) in [(200.0, 180.0), (400.0, 140.0), (650.0, 120.0)] {
        rules = rules.spawn(EntityGroup::Pickup, EntitySpec::at(x, y, 10.0));
    }
    rules
}
