// Database row types shared across modules.

pub mod draft;
