mod engine_scenarios;
mod oblique_cuts;
mod random_cuts;
mod split_modes;
mod structural_invariants;
mod tool_arming;
