use super::strings;
use crate::constants::{DEFAULT_SOURCE, KAUNAS_VENUE};
use crate::pipeline::normalize::{
    AgeBand, AgeFill, AgeRules, CategoryGroup, CategoryTable, ColumnMap, OtherRooms, PriceRules,
    RoomAgeHint, RoomAlias, RoomPolicy, TeamRules, TextMode, TimeRules, VenueProfile, YearPrice,
};

const ROOMS: [&str; 6] = ["Room1", "Room2", "Room3", "Room4", "Room5", "Room6"];

/// Kaunas sheets: fixed six-room set, rooms must resolve exactly
pub fn profile() -> VenueProfile {
    VenueProfile {
        name: KAUNAS_VENUE.to_string(),
        columns: ColumnMap {
            price: "PriceOrVoucher".to_string(),
            source: "SourceInfo".to_string(),
            ..ColumnMap::default()
        },
        rooms: vec![
            RoomAlias::new("Room1", &["Alias1", "Alias2"]),
            RoomAlias::new("Room2", &["Alias3", "Alias4"]),
            RoomAlias::new("Room3", &[]),
            RoomAlias::new("Room4", &[]),
            RoomAlias::new("Room5", &[]),
            RoomAlias::new("Room6", &[]),
        ],
        room_policy: RoomPolicy::Strict,
        allowed_rooms: Some(strings(&ROOMS)),
        source: CategoryTable {
            mode: TextMode::Loose,
            groups: vec![],
            keywords: vec![
                CategoryGroup::new("ONLINE", &[r"\bINTERNET", r"\bGOOGLE\b", r"\bWWW\b"]),
                CategoryGroup::new("RETURNING", &[r"\bRETURNED\b"]),
                CategoryGroup::new("COUPON", &[r"\bCOUPON", r"\bGIFT"]),
                CategoryGroup::new("REFERRED", &[r"REFERRED", r"FRIENDS"]),
                CategoryGroup::new("SOCIAL MEDIA", &[r"\bFACEBOOK\b", r"\bINSTAGRAM\b", r"\bTIKTOK\b"]),
                CategoryGroup::new("CAMPS", &[r"\bCAMP\b"]),
            ],
            empty_default: Some(DEFAULT_SOURCE.to_string()),
        },
        status: CategoryTable {
            mode: TextMode::Strict,
            groups: vec![
                CategoryGroup::new("Family", &["Family", "Multiple families"]),
                CategoryGroup::new("Friends & Family", &["Friends & Family"]),
                CategoryGroup::new("Students", &["Students", "School students", "Students / school"]),
                CategoryGroup::new("Foreigners", &["Foreigners"]),
                CategoryGroup::new("Colleagues", &["Colleagues"]),
                CategoryGroup::new("Organization", &["Organization"]),
                CategoryGroup::new("Friends", &["Friends"]),
            ],
            keywords: vec![],
            empty_default: Some("Unknown".to_string()),
        },
        celebration: CategoryTable {
            mode: TextMode::Strict,
            groups: vec![
                CategoryGroup::new("Birthday", &["Birthday"]),
                CategoryGroup::new("Company event", &["Company", "Team building"]),
                CategoryGroup::new("Other events", &["Other celebration", "Stag/Bachelorette"]),
                CategoryGroup::new("Educational", &["Excursion", "Camp"]),
                CategoryGroup::new("None", &["No celebration"]),
            ],
            keywords: vec![],
            empty_default: Some("None".to_string()),
        },
        time: TimeRules {
            offset_minutes: 90,
            casual_buckets: strings(&["12:00", "14:00", "16:00", "18:00", "20:00", "22:00"]),
            early_label: Some("10:00".to_string()),
        },
        age: AgeRules {
            bands: vec![
                AgeBand::new(7, 9, "7–9"),
                AgeBand::new(10, 13, "10–13"),
                AgeBand::new(14, 18, "14–17"),
                AgeBand::new(19, 24, "18–24"),
                AgeBand::new(25, 29, "25–29"),
                AgeBand::new(30, 40, "30–40"),
            ],
            top_label: "41+".to_string(),
            fill: Some(AgeFill {
                room_hints: vec![
                    RoomAgeHint { rooms: strings(&["Room1", "Room2"]), group: "7–9".to_string() },
                    RoomAgeHint { rooms: strings(&["Room3", "Room4"]), group: "10–13".to_string() },
                ],
                default_group: "25–29".to_string(),
            }),
        },
        teams: TeamRules {
            kids_rooms: strings(&["Room3", "Room4"]),
            adult_rooms: strings(&["Room5", "Room6"]),
            conditional_rooms: strings(&["Room1", "Room2"]),
            young_groups: strings(&["7–9", "10–13"]),
            other_rooms: OtherRooms::Unknown,
        },
        price: PriceRules::with_defaults(
            [(2018, 30), (2019, 30), (2020, 40), (2021, 40), (2022, 50), (2023, 50), (2024, 50), (2025, 90), (2026, 100)]
                .into_iter()
                .map(|(year, price)| YearPrice { year, price })
                .collect(),
            30,
        ),
        drop_duplicate_rows: false,
    }
}
