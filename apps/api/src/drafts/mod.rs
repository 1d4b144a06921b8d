// Drafts API — persistence for generation results the user keeps.

pub mod handlers;
