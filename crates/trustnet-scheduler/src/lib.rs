// crates/trustnet-scheduler/src/lib.rs
//
// trustnet-scheduler: periodic compute jobs driven by store updates.
//
// A job watches its local-trust matrix and pre-trust vector. Whenever
// a watched entity is updated into a new time window, the job recomputes
// global trust over the store state strictly before that update and
// stamps the result with the window start. Triggers arriving while a
// compute is in flight are coalesced: at most one compute runs per job,
// and the freshest pending window runs immediately afterwards.

pub mod jobs;

pub use jobs::JobScheduler;
