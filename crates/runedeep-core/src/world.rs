//! The explicit world context every system receives.

use hecs::{Entity, World};
use log::{debug, info};
use runedeep_logic::actor::Actor;
use runedeep_logic::bestiary::{MonsterDef, MonsterKind};
use runedeep_logic::config::GameOptions;
use runedeep_logic::constants::perception::SILENCE_RADIUS_SQ;
use runedeep_logic::constants::time::SYNCH_INTERVAL;
use runedeep_logic::duration::DurationKind;
use runedeep_logic::hazards::CloudKind;
use runedeep_logic::items::Item;
use runedeep_logic::level::{GamePhase, LevelInfo};
use runedeep_logic::messages::{Channel, MessageLog, MessageSink};
use runedeep_logic::movement::Coord;
use serde::{Deserialize, Serialize};

use crate::components::{Attitude, Behaviour, Cloud, ItemPile, Monster, Position, Submerged};
use crate::grid::{Grid, Terrain};
use crate::ports::LevelLayout;
use crate::rng::GameRng;

/// Game time. `elapsed` is in action-cost units (10 per normal turn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    pub turns: u64,
    pub elapsed: u64,
    /// Time left until the next slow world update.
    pub synch_time: u32,
    pub world_ticks: u64,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            turns: 0,
            elapsed: 0,
            synch_time: SYNCH_INTERVAL,
            world_ticks: 0,
        }
    }
}

pub struct GameWorld {
    pub actor: Actor,
    pub grid: Grid,
    /// Monsters, item piles and clouds.
    pub entities: World,
    pub level: LevelInfo,
    pub phase: GamePhase,
    pub clock: Clock,
    pub options: GameOptions,
    pub log: MessageLog,
    pub rng: GameRng,
}

impl GameWorld {
    pub fn new(actor: Actor, grid: Grid, level: LevelInfo, options: GameOptions, rng: GameRng) -> Self {
        let mut world = Self {
            actor,
            grid,
            entities: World::new(),
            level,
            phase: GamePhase::Descent,
            clock: Clock::default(),
            options,
            log: MessageLog::new(),
            rng,
        };
        world.actor.recompute_burden();
        world.update_phase();
        world.grid.update_visibility(world.actor.pos);
        world
    }

    pub fn say(&mut self, channel: Channel, text: &str) {
        self.log.emit(channel, text);
    }

    // ── Monsters ──

    /// Spawn a monster at `at` if the square can take it.
    pub fn spawn_monster(
        &mut self,
        kind: MonsterKind,
        at: Coord,
        attitude: Attitude,
        behaviour: Behaviour,
    ) -> Option<Entity> {
        let monster = Monster::new(kind, attitude, behaviour);
        if !self.is_free(at) || !self.can_stand(at, monster.def()) {
            return None;
        }
        let entity = self.entities.spawn((Position(at), monster));
        if let Some(cell) = self.grid.cell_mut(at) {
            cell.monster = Some(entity);
        }
        debug!("spawned {:?} at {:?}", kind, at);
        Some(entity)
    }

    pub fn remove_monster(&mut self, entity: Entity) {
        if let Some(at) = self.position_of(entity) {
            if let Some(cell) = self.grid.cell_mut(at) {
                if cell.monster == Some(entity) {
                    cell.monster = None;
                }
            }
        }
        let _ = self.entities.despawn(entity);
    }

    pub fn position_of(&self, entity: Entity) -> Option<Coord> {
        self.entities.get::<&Position>(entity).ok().map(|p| p.0)
    }

    pub fn monster(&self, entity: Entity) -> Option<Monster> {
        self.entities.get::<&Monster>(entity).ok().map(|m| (*m).clone())
    }

    pub fn is_submerged(&self, entity: Entity) -> bool {
        self.entities.satisfies::<&Submerged>(entity).unwrap_or(false)
    }

    /// Dive or surface. Returns false if nothing changed.
    pub fn set_submerged(&mut self, entity: Entity, submerged: bool) -> bool {
        if submerged {
            self.entities
                .insert_one(entity, Submerged)
                .map_err(|e| debug!("cannot submerge {:?}: {:?}", entity, e))
                .is_ok()
        } else {
            self.entities
                .remove_one::<Submerged>(entity)
                .map_err(|e| debug!("cannot surface {:?}: {:?}", entity, e))
                .is_ok()
        }
    }

    /// Move a monster to a free square, keeping grid and component in step.
    pub fn move_monster(&mut self, entity: Entity, to: Coord) -> bool {
        let Some(from) = self.position_of(entity) else {
            return false;
        };
        if !self.is_free(to) {
            return false;
        }
        if let Some(cell) = self.grid.cell_mut(from) {
            cell.monster = None;
        }
        if let Some(cell) = self.grid.cell_mut(to) {
            cell.monster = Some(entity);
        }
        if let Ok(mut pos) = self.entities.get::<&mut Position>(entity) {
            pos.0 = to;
        }
        true
    }

    /// Trade places between the actor and an adjacent monster.
    pub fn swap_with_actor(&mut self, entity: Entity) -> bool {
        let Some(theirs) = self.position_of(entity) else {
            return false;
        };
        let ours = self.actor.pos;
        if let Some(cell) = self.grid.cell_mut(theirs) {
            cell.monster = None;
        }
        if let Some(cell) = self.grid.cell_mut(ours) {
            cell.monster = Some(entity);
        }
        if let Ok(mut pos) = self.entities.get::<&mut Position>(entity) {
            pos.0 = ours;
        }
        self.actor.pos = theirs;
        true
    }

    /// Whether a creature with `def` could stand on `at`, ignoring occupants.
    pub fn can_stand(&self, at: Coord, def: &MonsterDef) -> bool {
        let terrain = self.grid.terrain(at);
        if terrain.is_solid() || !self.grid.in_bounds(at) {
            return false;
        }
        if def.aquatic {
            return terrain.is_water();
        }
        !terrain.is_hazardous()
    }

    /// Passable and not occupied by the actor or a monster.
    pub fn is_free(&self, at: Coord) -> bool {
        self.grid.in_bounds(at)
            && !self.grid.is_solid(at)
            && self.grid.monster_at(at).is_none()
            && self.actor.pos != at
    }

    /// Any awake-or-asleep hostile the actor can see, submerged ones excepted.
    pub fn hostile_in_view(&self) -> bool {
        self.entities
            .query::<(&Position, &Monster)>()
            .without::<&Submerged>()
            .iter()
            .any(|(_, (pos, monster))| monster.is_hostile() && self.grid.is_visible(pos.0))
    }

    /// Silence is an aura centred on the actor.
    pub fn actor_silenced(&self) -> bool {
        self.actor.has(DurationKind::Silence)
    }

    /// Wake sleeping monsters within `loudness` squares of `at`. Noise neither
    /// leaves nor enters the actor's silence.
    pub fn make_noise(&mut self, at: Coord, loudness: i32) {
        let hush = self.actor_silenced().then_some(self.actor.pos);
        let muffled = |c: Coord| hush.is_some_and(|centre| c.distance_squared(centre) <= SILENCE_RADIUS_SQ);
        if muffled(at) {
            return;
        }
        let reach = loudness * loudness;
        for (_, (pos, monster)) in self.entities.query_mut::<(&Position, &mut Monster)>() {
            if monster.is_asleep() && pos.0.distance_squared(at) <= reach && !muffled(pos.0) {
                monster.behaviour = Behaviour::Wandering;
            }
        }
    }

    // ── Floor features ──

    /// Put a cloud on `at`, strengthening any cloud already there.
    pub fn place_cloud(&mut self, kind: CloudKind, at: Coord, density: i32) -> Option<Entity> {
        if self.grid.is_solid(at) || density <= 0 {
            return None;
        }
        if let Some(existing) = self.grid.cloud_at(at) {
            if let Ok(mut cloud) = self.entities.get::<&mut Cloud>(existing) {
                cloud.kind = kind;
                cloud.density = cloud.density.max(density);
                return Some(existing);
            }
        }
        let entity = self.entities.spawn((Position(at), Cloud { kind, density }));
        if let Some(cell) = self.grid.cell_mut(at) {
            cell.cloud = Some(entity);
        }
        Some(entity)
    }

    pub fn remove_cloud(&mut self, entity: Entity) {
        if let Some(at) = self.position_of(entity) {
            if let Some(cell) = self.grid.cell_mut(at) {
                if cell.cloud == Some(entity) {
                    cell.cloud = None;
                }
            }
        }
        let _ = self.entities.despawn(entity);
    }

    pub fn cloud(&self, entity: Entity) -> Option<Cloud> {
        self.entities.get::<&Cloud>(entity).ok().map(|c| *c)
    }

    pub fn drop_item(&mut self, at: Coord, item: Item) {
        if let Some(existing) = self.grid.items_at(at) {
            if let Ok(mut pile) = self.entities.get::<&mut ItemPile>(existing) {
                pile.push(item);
                return;
            }
        }
        let entity = self.entities.spawn((Position(at), ItemPile::new(vec![item])));
        if let Some(cell) = self.grid.cell_mut(at) {
            cell.items = Some(entity);
        }
    }

    /// Remove and return everything lying on `at`.
    pub fn take_items(&mut self, at: Coord) -> Vec<Item> {
        let Some(entity) = self.grid.items_at(at) else {
            return Vec::new();
        };
        let items = self
            .entities
            .remove_one::<ItemPile>(entity)
            .map(|pile| pile.items)
            .unwrap_or_default();
        let _ = self.entities.despawn(entity);
        if let Some(cell) = self.grid.cell_mut(at) {
            cell.items = None;
        }
        items
    }

    // ── Levels ──

    /// Replace the current level with `layout`.
    pub fn install_layout(&mut self, layout: LevelLayout, level: LevelInfo) {
        self.entities.clear();
        self.grid = layout.grid;
        self.grid.clear_occupants();
        self.level = level;
        self.actor.pos = layout.start;

        for placement in layout.monsters {
            if self
                .spawn_monster(placement.kind, placement.at, placement.attitude, placement.behaviour)
                .is_none()
            {
                debug!("dropped {:?}: {:?} is not free", placement.kind, placement.at);
            }
        }
        for (at, item) in layout.items {
            self.drop_item(at, item);
        }
        self.grid.update_visibility(self.actor.pos);
        info!("entered {:?} depth {}", level.kind, level.depth);
    }

    /// The Orb turns the descent into an escape.
    pub fn update_phase(&mut self) {
        self.phase = if self.actor.carrying_orb() {
            GamePhase::OrbRun
        } else {
            GamePhase::Descent
        };
    }

    /// Every grid reference matches an entity at that position, and every
    /// positioned entity is referenced from its cell.
    pub fn occupancy_consistent(&self) -> bool {
        let grid_ok = self.grid.coords().all(|at| {
            let Some(cell) = self.grid.cell(at) else {
                return false;
            };
            [cell.monster, cell.items, cell.cloud]
                .into_iter()
                .flatten()
                .all(|e| self.position_of(e) == Some(at))
        });
        let entities_ok = self.entities.query::<&Position>().iter().all(|(e, pos)| {
            self.grid.cell(pos.0).is_some_and(|cell| {
                cell.monster == Some(e) || cell.items == Some(e) || cell.cloud == Some(e)
            })
        });
        grid_ok && entities_ok && self.grid.monster_at(self.actor.pos).is_none()
    }

    pub fn stairs(&self) -> Vec<Coord> {
        let mut stairs = self.grid.find_terrain(Terrain::StairsUp);
        stairs.extend(self.grid.find_terrain(Terrain::StairsDown));
        stairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runedeep_logic::actor::Species;
    use runedeep_logic::items::ItemKind;

    fn world() -> GameWorld {
        let (grid, start) = Grid::from_rows(&[
            "#######",
            "#@....#",
            "#..W..#",
            "#######",
        ])
        .unwrap();
        let mut actor = Actor::new("Tess", Species::Human);
        actor.pos = start;
        GameWorld::new(actor, grid, LevelInfo::dungeon(1), GameOptions::default(), GameRng::seeded(1))
    }

    #[test]
    fn spawn_and_move_keep_grid_in_step() {
        let mut w = world();
        let rat = w
            .spawn_monster(MonsterKind::Rat, Coord::new(3, 1), Attitude::Hostile, Behaviour::Sleeping)
            .unwrap();
        assert_eq!(w.grid.monster_at(Coord::new(3, 1)), Some(rat));
        assert!(w.move_monster(rat, Coord::new(4, 1)));
        assert_eq!(w.grid.monster_at(Coord::new(3, 1)), None);
        assert_eq!(w.position_of(rat), Some(Coord::new(4, 1)));
        assert!(w.occupancy_consistent());
        w.remove_monster(rat);
        assert_eq!(w.grid.monster_at(Coord::new(4, 1)), None);
        assert!(w.occupancy_consistent());
    }

    #[test]
    fn cannot_spawn_on_actor_wall_or_wrong_habitat() {
        let mut w = world();
        let start = w.actor.pos;
        assert!(w.spawn_monster(MonsterKind::Rat, start, Attitude::Hostile, Behaviour::Wandering).is_none());
        assert!(w
            .spawn_monster(MonsterKind::Rat, Coord::new(0, 0), Attitude::Hostile, Behaviour::Wandering)
            .is_none());
        assert!(w
            .spawn_monster(MonsterKind::Rat, Coord::new(3, 2), Attitude::Hostile, Behaviour::Wandering)
            .is_none());
        assert!(w
            .spawn_monster(MonsterKind::GiantEel, Coord::new(2, 1), Attitude::Hostile, Behaviour::Wandering)
            .is_none());
        assert!(w
            .spawn_monster(MonsterKind::GiantEel, Coord::new(3, 2), Attitude::Hostile, Behaviour::Wandering)
            .is_some());
    }

    #[test]
    fn noise_wakes_nearby_sleepers() {
        let mut w = world();
        let rat = w
            .spawn_monster(MonsterKind::Rat, Coord::new(5, 1), Attitude::Hostile, Behaviour::Sleeping)
            .unwrap();
        w.make_noise(Coord::new(1, 1), 2);
        assert!(w.monster(rat).unwrap().is_asleep());
        w.make_noise(Coord::new(1, 1), 10);
        assert!(!w.monster(rat).unwrap().is_asleep());
    }

    #[test]
    fn items_stack_and_are_taken_together() {
        let mut w = world();
        let at = Coord::new(2, 1);
        w.drop_item(at, Item::new(ItemKind::Gold, 3));
        w.drop_item(at, Item::new(ItemKind::Gold, 4));
        w.drop_item(at, Item::new(ItemKind::Potion, 1));
        let items = w.take_items(at);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 7);
        assert!(w.take_items(at).is_empty());
        assert!(w.occupancy_consistent());
    }

    #[test]
    fn clouds_merge_on_one_square() {
        let mut w = world();
        let at = Coord::new(2, 1);
        let first = w.place_cloud(CloudKind::Fire, at, 5).unwrap();
        let second = w.place_cloud(CloudKind::Fire, at, 9).unwrap();
        assert_eq!(first, second);
        assert_eq!(w.cloud(first).unwrap().density, 9);
        assert!(w.place_cloud(CloudKind::Fire, Coord::new(0, 0), 5).is_none());
    }

    #[test]
    fn surfacing_twice_reports_no_change() {
        let mut w = world();
        let eel = w
            .spawn_monster(MonsterKind::GiantEel, Coord::new(3, 2), Attitude::Hostile, Behaviour::Wandering)
            .unwrap();
        assert!(w.set_submerged(eel, true));
        assert!(w.is_submerged(eel));
        assert!(w.set_submerged(eel, false));
        assert!(!w.set_submerged(eel, false));
        w.remove_monster(eel);
        assert!(!w.set_submerged(eel, true));
    }
}
