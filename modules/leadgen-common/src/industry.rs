//! Static vendor lookup tables.
//!
//! Both tables are immutable after startup and safe for concurrent reads.

/// Apollo industry name → organization industry tag id.
pub const INDUSTRY_IDS: &[(&str, &str)] = &[
    ("information technology & services", "5567cd4773696439b10b0000"),
    ("construction", "5567cd4773696439dd350000"),
    ("marketing & advertising", "5567cd467369644d39040000"),
    ("health, wellness & fitness", "5567cddb7369644d250c0000"),
    ("pharmaceuticals", "5567e0eb73696410e4bd1200"),
    ("biotechnology", "5567d08e7369645dbc4b0000"),
    ("real estate", "5567cd477369645401010000"),
    ("management consulting", "5567cdd47369643dbf260000"),
    ("computer software", "5567cd4e7369643b70010000"),
    ("internet", "5567cd4d736964397e020000"),
    ("semiconductors", "5567e0d87369640e5aa30c00"),
    ("retail", "5567ced173696450cb580000"),
    ("financial services", "5567cdd67369643e64020000"),
    ("consumer services", "5567d1127261697f2b1d0000"),
    ("hospital & health care", "5567cdde73696439812c0000"),
    ("automotive", "5567cdf27369644cfd800000"),
    ("restaurants", "5567e0e0736964198de70700"),
    ("education management", "5567ce9e736964540d540000"),
    ("food & beverages", "5567ce1e7369643b806a0000"),
    ("design", "5567cdbc73696439d90b0000"),
    ("apparel & fashion", "5567cd82736964540d0b0000"),
    ("import & export", "5567ce9d7369645430c50000"),
    ("hospitality", "5567ce9d7369643bc19c0000"),
    ("accounting", "5567ce1f7369643b78570000"),
    ("events services", "5567cd8e7369645409450000"),
    ("luxury goods & jewelry", "5567cda97369644cfd3e0000"),
    ("cosmetics", "5567e1ae73696423dc040000"),
    ("logistics & supply chain", "5567cd4973696439b9010000"),
    ("warehousing", "5567e127736964181e700200"),
    ("package/freight delivery", "5567e8bb7369641a658f0000"),
];

/// Company size range → Apollo employee-range token (already URL-encoded).
/// The last entry is open-ended.
pub const COMPANY_SIZE_RANGES: &[(&str, &str)] = &[
    ("1-10", "1%2C10"),
    ("11-50", "11%2C50"),
    ("51-200", "51%2C200"),
    ("201-500", "201%2C500"),
    ("501-1000", "501%2C1000"),
    ("1001-5000", "1001%2C5000"),
    ("5001-10000", "5001%2C10000"),
    ("10001+", "10001%2C"),
];

/// Look up the Apollo tag id for an industry name (case-insensitive).
pub fn industry_id(name: &str) -> Option<&'static str> {
    let needle = name.trim().to_lowercase();
    INDUSTRY_IDS
        .iter()
        .find(|(industry, _)| *industry == needle)
        .map(|(_, id)| *id)
}

/// Look up the employee-range token for a company size range.
/// Unknown ranges return `None` and are dropped by callers.
pub fn employee_range_token(size_range: &str) -> Option<&'static str> {
    let needle = size_range.trim();
    COMPANY_SIZE_RANGES
        .iter()
        .find(|(range, _)| *range == needle)
        .map(|(_, token)| *token)
}
