pub mod commands;
pub mod contests;
pub mod display;
pub mod events;
pub mod profile;
pub mod rating;
pub mod roster;
pub mod standings;
pub mod templates;
