pub mod book;
pub mod calendar;
pub mod categories;
pub mod order;
pub mod reminder;
pub mod stats;
pub mod streak;
pub mod view;
