mod common;
mod reconcile;
