//! Built-in domain vocabulary for targeted extraction

/// IATA codes of major airports
pub const KNOWN_AIRPORT_CODES: &[&str] = &[
    "AMS", "ATL", "AUS", "BCN", "BKK", "BOS", "BWI", "CDG", "CLT", "DCA", "DEN", "DFW", "DTW",
    "DUB", "DXB", "EWR", "FCO", "FLL", "FRA", "GRU", "HKG", "HND", "IAD", "IAH", "ICN", "IST",
    "JFK", "LAS", "LAX", "LGA", "LHR", "MAD", "MCO", "MDW", "MEX", "MIA", "MSP", "MUC", "NRT",
    "OAK", "ORD", "PDX", "PEK", "PHL", "PHX", "PVG", "SAN", "SEA", "SFO", "SIN", "SJC", "SLC",
    "STN", "SYD", "TPA", "YUL", "YVR", "YYZ", "ZRH",
];

/// Words that signal itinerary or pricing content
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "flight",
    "flights",
    "depart",
    "departs",
    "departure",
    "arrive",
    "arrives",
    "arrival",
    "nonstop",
    "stop",
    "stops",
    "layover",
    "duration",
    "airline",
    "fare",
    "price",
    "total",
    "economy",
    "business",
    "first class",
    "baggage",
    "terminal",
    "gate",
    "seat",
];
