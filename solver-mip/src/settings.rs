//! Configuration settings for the MIP solver.

use solver_lp::SimplexSettings;

use crate::cuts::GomorySettings;

/// MIP solver settings.
#[derive(Debug, Clone)]
pub struct MipSettings {
    // === Termination criteria ===
    /// Relative gap between incumbent and root relaxation at which the search
    /// stops: |incumbent - root| / |root| <= gap_tol.
    pub gap_tol: f64,

    /// Integer feasibility tolerance.
    /// Integer-block coordinates within this distance of an integer are
    /// snapped, and a point is integral when the residual norm is within it.
    pub int_feas_tol: f64,

    /// Maximum number of oracle calls (None = unlimited).
    pub max_nodes: Option<u64>,

    /// Time limit in milliseconds (None = unlimited).
    pub time_limit_ms: Option<u64>,

    // === Cut settings ===
    /// Run the cut-plane adapter on fractional nodes before branching.
    pub cut_planes: bool,

    /// Also separate at the root node.
    pub cut_at_root: bool,

    /// Gomory generator tolerances.
    pub gomory: GomorySettings,

    // === Search ===
    /// Drop pending nodes whose inherited bound cannot beat a new incumbent.
    pub prune_on_incumbent: bool,

    /// Keep a per-node log in the solution.
    pub record_nodes: bool,

    // === Oracle ===
    /// Settings for the simplex relaxation oracle.
    pub simplex: SimplexSettings,

    // === Output ===
    /// Print progress information.
    pub verbose: bool,

    /// Log frequency (print every N oracle calls).
    pub log_freq: u64,
}

impl Default for MipSettings {
    fn default() -> Self {
        // Allow environment variable override for the cut-plane pass
        let cut_planes = std::env::var("FLEETMIP_CUT_PLANES")
            .map(|v| v == "1")
            .unwrap_or(false);

        Self {
            // Termination
            gap_tol: 0.03,
            int_feas_tol: 1e-6,
            max_nodes: None,
            time_limit_ms: None,

            // Cuts
            cut_planes,
            cut_at_root: false,
            gomory: GomorySettings::default(),

            // Search
            prune_on_incumbent: false,
            record_nodes: false,

            // Oracle
            simplex: SimplexSettings::default(),

            // Output
            verbose: false,
            log_freq: 100,
        }
    }
}

impl MipSettings {
    /// Create settings with verbose output enabled.
    pub fn verbose() -> Self {
        let mut s = Self::default();
        s.verbose = true;
        s.log_freq = 1;
        s
    }

    /// Set time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_ms = Some((seconds * 1000.0) as u64);
        self
    }

    /// Set maximum oracle calls.
    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    /// Set optimality gap tolerance.
    pub fn with_gap_tol(mut self, tol: f64) -> Self {
        self.gap_tol = tol;
        self
    }

    /// Enable or disable the cut-plane pass.
    pub fn with_cut_planes(mut self, enabled: bool) -> Self {
        self.cut_planes = enabled;
        self
    }

    /// Keep a per-node log in the solution.
    pub fn with_node_log(mut self) -> Self {
        self.record_nodes = true;
        self
    }
}
