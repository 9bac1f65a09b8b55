/*!
Reading, writing and downloading chain files.
*/

pub mod fetch;
pub mod reader;
pub mod writer;
