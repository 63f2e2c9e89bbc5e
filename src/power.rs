// Maps merged cec-client output to a power state.
//
// cec-client answers a "pow" query with a line like "power status: on" or
// "power status: standby". Only the exact phrase "power status: on" counts as
// on; anything else (standby, unknown, garbage, empty output) reads as off.
pub fn tv_power_on(output: &str) -> bool {
    output.to_ascii_lowercase().contains("power status: on")
}
