/*!
Contains utilities for efficiently parsing chain files and projecting intervals through them.
*/

pub mod align;
pub mod chain;
pub mod map;
pub mod project;
