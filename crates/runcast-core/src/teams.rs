// Club reference data: the 30 MLB teams with park run factors, and the
// alias table used to normalise team names from different exports.

use crate::model::Team;

/// Marker for players without a club.
pub const FREE_AGENT: &str = "FA";

/// (abbreviation, name, league, division, park factor)
const REFERENCE_TEAMS: &[(&str, &str, &str, &str, f64)] = &[
    ("LAA", "Los Angeles Angels", "AL", "West", 1.00),
    ("ARI", "Arizona Diamondbacks", "NL", "West", 1.05),
    ("ATL", "Atlanta Braves", "NL", "East", 1.00),
    ("BAL", "Baltimore Orioles", "AL", "East", 1.02),
    ("BOS", "Boston Red Sox", "AL", "East", 1.04),
    ("CHC", "Chicago Cubs", "NL", "Central", 1.02),
    ("CWS", "Chicago White Sox", "AL", "Central", 1.00),
    ("CIN", "Cincinnati Reds", "NL", "Central", 1.06),
    ("CLE", "Cleveland Guardians", "AL", "Central", 0.97),
    ("COL", "Colorado Rockies", "NL", "West", 1.15),
    ("DET", "Detroit Tigers", "AL", "Central", 0.98),
    ("HOU", "Houston Astros", "AL", "West", 1.00),
    ("KC", "Kansas City Royals", "AL", "Central", 1.01),
    ("LAD", "Los Angeles Dodgers", "NL", "West", 0.98),
    ("MIA", "Miami Marlins", "NL", "East", 0.97),
    ("MIL", "Milwaukee Brewers", "NL", "Central", 1.01),
    ("MIN", "Minnesota Twins", "AL", "Central", 1.03),
    ("NYM", "New York Mets", "NL", "East", 0.98),
    ("NYY", "New York Yankees", "AL", "East", 1.03),
    ("OAK", "Oakland Athletics", "AL", "West", 0.96),
    ("PHI", "Philadelphia Phillies", "NL", "East", 1.02),
    ("PIT", "Pittsburgh Pirates", "NL", "Central", 0.98),
    ("SD", "San Diego Padres", "NL", "West", 0.97),
    ("SF", "San Francisco Giants", "NL", "West", 0.96),
    ("SEA", "Seattle Mariners", "AL", "West", 0.95),
    ("STL", "St. Louis Cardinals", "NL", "Central", 0.99),
    ("TB", "Tampa Bay Rays", "AL", "East", 0.97),
    ("TEX", "Texas Rangers", "AL", "West", 1.04),
    ("TOR", "Toronto Blue Jays", "AL", "East", 1.01),
    ("WSH", "Washington Nationals", "NL", "East", 1.00),
];

/// Nicknames and alternate abbreviations seen in FanGraphs / Savant exports.
const TEAM_ALIASES: &[(&str, &str)] = &[
    ("Angels", "LAA"),
    ("Diamondbacks", "ARI"),
    ("D-backs", "ARI"),
    ("Braves", "ATL"),
    ("Orioles", "BAL"),
    ("Red Sox", "BOS"),
    ("Cubs", "CHC"),
    ("White Sox", "CWS"),
    ("CHW", "CWS"),
    ("Reds", "CIN"),
    ("Guardians", "CLE"),
    ("Indians", "CLE"),
    ("Rockies", "COL"),
    ("Tigers", "DET"),
    ("Astros", "HOU"),
    ("Royals", "KC"),
    ("KCR", "KC"),
    ("Dodgers", "LAD"),
    ("Marlins", "MIA"),
    ("Brewers", "MIL"),
    ("Twins", "MIN"),
    ("Mets", "NYM"),
    ("Yankees", "NYY"),
    ("Athletics", "OAK"),
    ("A's", "OAK"),
    ("ATH", "OAK"),
    ("Phillies", "PHI"),
    ("Pirates", "PIT"),
    ("Padres", "SD"),
    ("SDP", "SD"),
    ("Giants", "SF"),
    ("SFG", "SF"),
    ("Mariners", "SEA"),
    ("Cardinals", "STL"),
    ("Rays", "TB"),
    ("TBR", "TB"),
    ("Rangers", "TEX"),
    ("Blue Jays", "TOR"),
    ("Nationals", "WSH"),
    ("WSN", "WSH"),
];

/// All 30 reference teams.
pub fn reference_teams() -> Vec<Team> {
    REFERENCE_TEAMS
        .iter()
        .map(|&(abbr, name, league, division, park_factor)| Team {
            id: abbr.to_string(),
            name: name.to_string(),
            abbreviation: abbr.to_string(),
            league: league.to_string(),
            division: division.to_string(),
            park_factor,
        })
        .collect()
}

/// Map a team abbreviation, full name or nickname to the canonical
/// abbreviation. Returns `None` for blank, "FA" or unrecognised input.
pub fn resolve_team_abbreviation(raw: &str) -> Option<&'static str> {
    let key = raw.trim();
    if key.is_empty() || key.eq_ignore_ascii_case(FREE_AGENT) {
        return None;
    }
    REFERENCE_TEAMS
        .iter()
        .find(|(abbr, name, ..)| key.eq_ignore_ascii_case(abbr) || key.eq_ignore_ascii_case(name))
        .map(|(abbr, ..)| *abbr)
        .or_else(|| {
            TEAM_ALIASES
                .iter()
                .find(|(alias, _)| key.eq_ignore_ascii_case(alias))
                .map(|(_, abbr)| *abbr)
        })
}
