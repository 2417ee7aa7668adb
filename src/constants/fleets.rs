// Organization names as they appear in the telemetry databases, lowercased
pub const ZIM: &str = "zim";
pub const SAMSKIP: &str = "samskip";
pub const HMM: &str = "hmm";

// The Bursts query only returns rows of this customer
pub const BURSTS_CUSTOMER: &str = "Zim";

pub const NEW_PV_ID_PREFIX: &str = "A0";
pub const NEW_PV_SERIES_MIN: u32 = 6000;
pub const ZIM_C_SERIES_PREFIX: &str = "C";
