//! Built-in grid and calendar data.
//!
//! Used when the session registry is unreachable, so consumers always have
//! a driver list and a calendar to offer. The live roster supersedes this
//! whenever the registry answers.

use crate::types::{Driver, Track};

const GRID: &[(&str, &str, &str)] = &[
    ("verstappen", "Max Verstappen", "Red Bull Racing"),
    ("perez", "Sergio Perez", "Red Bull Racing"),
    ("leclerc", "Charles Leclerc", "Ferrari"),
    ("hamilton", "Lewis Hamilton", "Ferrari"),
    ("norris", "Lando Norris", "McLaren"),
    ("piastri", "Oscar Piastri", "McLaren"),
    ("russell", "George Russell", "Mercedes"),
    ("antonelli", "Kimi Antonelli", "Mercedes"),
    ("alonso", "Fernando Alonso", "Aston Martin"),
    ("stroll", "Lance Stroll", "Aston Martin"),
    ("albon", "Alex Albon", "Williams"),
    ("sainz", "Carlos Sainz", "Williams"),
    ("gasly", "Pierre Gasly", "Alpine"),
    ("doohan", "Jack Doohan", "Alpine"),
    ("tsunoda", "Yuki Tsunoda", "RB"),
    ("lawson", "Liam Lawson", "RB"),
    ("ocon", "Esteban Ocon", "Haas"),
    ("bearman", "Oliver Bearman", "Haas"),
    ("hulkenberg", "Nico Hulkenberg", "Sauber"),
    ("bortoleto", "Gabriel Bortoleto", "Sauber"),
];

const CALENDAR: &[(&str, &str, &str)] = &[
    ("melbourne", "Albert Park", "Australia"),
    ("shanghai", "Shanghai Int. Circuit", "China"),
    ("suzuka", "Suzuka", "Japan"),
    ("bahrain", "Bahrain Int. Circuit", "Bahrain"),
    ("jeddah", "Jeddah Corniche", "Saudi Arabia"),
    ("miami", "Miami Int. Autodrome", "USA"),
    ("imola", "Imola", "Italy"),
    ("monaco", "Monaco", "Monaco"),
    ("barcelona", "Catalunya", "Spain"),
    ("montreal", "Gilles Villeneuve", "Canada"),
    ("austria", "Red Bull Ring", "Austria"),
    ("silverstone", "Silverstone", "UK"),
    ("spa", "Spa-Francorchamps", "Belgium"),
    ("hungary", "Hungaroring", "Hungary"),
    ("zandvoort", "Zandvoort", "Netherlands"),
    ("monza", "Monza", "Italy"),
    ("baku", "Baku City Circuit", "Azerbaijan"),
    ("singapore", "Marina Bay", "Singapore"),
    ("austin", "COTA", "USA"),
    ("mexico", "Autodromo Hermanos Rodriguez", "Mexico"),
    ("brazil", "Interlagos", "Brazil"),
    ("vegas", "Las Vegas Strip", "USA"),
    ("qatar", "Lusail", "Qatar"),
    ("abudhabi", "Yas Marina", "UAE"),
];

/// The built-in driver grid, sorted by team like the live roster.
pub fn default_grid() -> Vec<Driver> {
    let mut drivers: Vec<Driver> = GRID
        .iter()
        .map(|(id, name, team)| Driver {
            id: (*id).to_string(),
            name: (*name).to_string(),
            team: (*team).to_string(),
        })
        .collect();
    drivers.sort_by(|a, b| a.team.cmp(&b.team));
    drivers
}

/// The built-in race calendar, in season order.
pub fn default_calendar() -> Vec<Track> {
    CALENDAR
        .iter()
        .map(|(id, name, location)| Track {
            id: (*id).to_string(),
            name: (*name).to_string(),
            location: (*location).to_string(),
        })
        .collect()
}

/// Look up a driver in the built-in grid.
pub fn find_driver(driver_id: &str) -> Option<Driver> {
    default_grid().into_iter().find(|d| d.id == driver_id)
}

/// Look up a track in the built-in calendar.
pub fn find_track(track_id: &str) -> Option<Track> {
    default_calendar().into_iter().find(|t| t.id == track_id)
}
