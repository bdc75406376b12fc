//! Run parameters for a scenario
//!
//! `Parameters` holds runtime settings:
//! - fixed step size and end time,
//! - how often the CLI prints a trace row

#[derive(Debug, Clone)]
pub struct Parameters {
    pub t_end: f64, // time end
    pub h0: f64, // step size
    pub trace_every: usize, // print a trace row every n steps
}

impl Parameters {
    /// Number of fixed steps needed to reach `t_end`
    pub fn steps(&self) -> usize {
        (self.t_end / self.h0).round() as usize
    }
}
