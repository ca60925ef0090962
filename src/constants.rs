pub(crate) const LOGIN_ENDPOINT: &str = "/api.cgi?cmd=Login";
pub(crate) const SNAP_ENDPOINT: &str = "/cgi-bin/api.cgi?cmd=Snap&channel=0";

pub(crate) const DEFAULT_USERNAME: &str = "admin";

pub const SNAPSHOT_FILENAME: &str = "latest.jpg";
pub(crate) const SNAPSHOT_TMP_FILENAME: &str = ".latest.jpg.tmp";

/// Seconds to back off after a failed capture cycle.
pub const DEFAULT_FAILURE_COOLDOWN: u64 = 10;
