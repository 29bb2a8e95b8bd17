//! Key map and command dispatch.

use log::debug;
use runedeep_logic::messages::Channel;
use runedeep_logic::movement::Direction;

use crate::error::Rejection;
use crate::ports::{InputProvider, Keycode};
use crate::turn::TurnState;
use crate::world::GameWorld;

use super::{
    close_door, move_player, open_door, pick_up, search_command, shout, start_rest, start_running,
    start_stairs,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Run(Direction),
    /// Open (or attack, or disarm) in a direction given with the key.
    OpenToward(Direction),
    /// Open, asking for a direction.
    OpenDoor,
    CloseDoor,
    Search,
    Rest,
    GoUp,
    GoDown,
    PickUp,
    ToggleAutopickup,
    Redraw,
    ExperienceCheck,
    Shout,
    Save,
    Quit,
    Unknown,
}

/// Outcome of resolving one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The turn is over; the world reacts.
    Consumed,
    /// Valid, but no time passes.
    Free,
    /// Refused with a message; no time passes.
    Rejected(Rejection),
}

/// Something the host has to do outside the turn loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    Save,
    Quit,
}

pub fn keymap(key: Keycode) -> Command {
    match key {
        Keycode::Char(c) => {
            if let Some(dir) = Direction::from_vi_key(c) {
                return if c.is_ascii_uppercase() {
                    Command::Run(dir)
                } else {
                    Command::Move(dir)
                };
            }
            match c {
                'o' => Command::OpenDoor,
                'c' => Command::CloseDoor,
                's' | '.' => Command::Search,
                '5' => Command::Rest,
                '<' => Command::GoUp,
                '>' => Command::GoDown,
                'g' | ',' => Command::PickUp,
                'C' => Command::ExperienceCheck,
                '!' => Command::Shout,
                'S' => Command::Save,
                'Q' => Command::Quit,
                _ => Command::Unknown,
            }
        }
        Keycode::Ctrl('a') => Command::ToggleAutopickup,
        Keycode::Ctrl('r') => Command::Redraw,
        Keycode::Ctrl(c) => match Direction::from_vi_key(c) {
            Some(dir) => Command::OpenToward(dir),
            None => Command::Unknown,
        },
        Keycode::Escape => Command::Unknown,
    }
}

/// Ask for a direction. Anything but a direction key cancels silently.
pub fn prompt_direction(
    world: &mut GameWorld,
    turn: &mut TurnState,
    input: &mut dyn InputProvider,
) -> Option<Direction> {
    world.say(Channel::Prompt, "Which direction?");
    turn.prompted = true;
    match input.next_key()? {
        Keycode::Char(c) if c.is_ascii_lowercase() => Direction::from_vi_key(c),
        _ => None,
    }
}

pub fn resolve(
    world: &mut GameWorld,
    turn: &mut TurnState,
    command: Command,
    input: &mut dyn InputProvider,
) -> Resolution {
    debug!("resolving {:?}", command);
    let resolution = match command {
        Command::Move(dir) => move_player(world, turn, dir.offset()),
        Command::Run(dir) => start_running(world, dir),
        Command::OpenToward(dir) => open_door(world, turn, dir.offset(), true),
        Command::OpenDoor => match prompt_direction(world, turn, input) {
            Some(dir) => open_door(world, turn, dir.offset(), true),
            None => Resolution::Free,
        },
        Command::CloseDoor => match prompt_direction(world, turn, input) {
            Some(dir) => close_door(world, turn, dir.offset()),
            None => Resolution::Free,
        },
        Command::Search => search_command(world),
        Command::Rest => start_rest(world),
        Command::GoUp => start_stairs(world, true),
        Command::GoDown => start_stairs(world, false),
        Command::PickUp => pick_up(world),
        Command::ToggleAutopickup => {
            world.options.autopickup = !world.options.autopickup;
            let state = if world.options.autopickup { "on" } else { "off" };
            world.say(Channel::Plain, &format!("Autopickup is now {}.", state));
            Resolution::Free
        }
        Command::Redraw => {
            turn.full_redraw = true;
            Resolution::Free
        }
        Command::ExperienceCheck => {
            let text = format!(
                "You are a level {} {}.",
                world.actor.level,
                world.actor.species.name()
            );
            world.say(Channel::Plain, &text);
            Resolution::Free
        }
        Command::Shout => shout(world),
        Command::Save => {
            turn.session = Some(SessionRequest::Save);
            Resolution::Free
        }
        Command::Quit => {
            turn.session = Some(SessionRequest::Quit);
            Resolution::Free
        }
        Command::Unknown => Resolution::Rejected(Rejection::UnknownCommand),
    };

    match &resolution {
        Resolution::Consumed => turn.turn_over = true,
        Resolution::Rejected(rejection) => {
            world.actor.stop_running();
            world.say(Channel::Plain, &rejection.to_string());
        }
        Resolution::Free => {}
    }
    resolution
}
