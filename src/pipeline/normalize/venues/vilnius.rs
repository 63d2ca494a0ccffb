use super::strings;
use crate::constants::{DEFAULT_SOURCE, VILNIUS_VENUE};
use crate::pipeline::normalize::{
    AgeBand, AgeRules, CategoryGroup, CategoryTable, ColumnMap, OtherRooms, PriceRules, RoomAlias,
    RoomPolicy, TeamRules, TextMode, TimeRules, VenueProfile, YearPrice,
};

/// Vilnius sheets: unknown rooms are kept for manual review
pub fn profile() -> VenueProfile {
    VenueProfile {
        name: VILNIUS_VENUE.to_string(),
        columns: ColumnMap::default(),
        rooms: vec![
            RoomAlias::new("ROOM1", &["ROOM1", "R1", "Alias1"]),
            RoomAlias::new("ROOM2", &["ROOM2", "R2", "Alias2"]),
            RoomAlias::new("ROOM3", &["ROOM3", "R3", "Alias3"]),
        ],
        room_policy: RoomPolicy::Permissive,
        allowed_rooms: None,
        source: CategoryTable {
            mode: TextMode::Loose,
            groups: vec![],
            keywords: vec![
                CategoryGroup::new("ONLINE", &["INTERNET", "WWW", "GOOGLE", "FOUND ONLINE"]),
                CategoryGroup::new("VISITED", &["VISITED", "ALREADY VISITED"]),
                CategoryGroup::new("COUPON", &["COUPON", "GIFT"]),
                CategoryGroup::new("REFERRED", &["REFERRED", "FRIEND"]),
                CategoryGroup::new("SOCIAL", &["FACEBOOK", "INSTAGRAM", "TIKTOK"]),
                CategoryGroup::new("CAMP", &["CAMP", "SCHOOL CAMP", "SUMMER CAMP"]),
            ],
            empty_default: Some(DEFAULT_SOURCE.to_string()),
        },
        status: CategoryTable {
            mode: TextMode::Strict,
            groups: vec![
                CategoryGroup::new("Family", &["Family", "Multiple families"]),
                CategoryGroup::new("Friends & Family", &["Friends & Family", "Friends with foreign friends"]),
                CategoryGroup::new("Students", &["Students", "School students", "Students/School"]),
                CategoryGroup::new("Foreigners", &["Foreigners", "Foreign students"]),
                CategoryGroup::new("Colleagues", &["Colleagues", "Co-workers"]),
                CategoryGroup::new("Company", &["Company"]),
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
                CategoryGroup::new("Other celebrations", &["Other", "Occasion", "Party"]),
                CategoryGroup::new("Educational", &["Trip", "Camp"]),
                CategoryGroup::new("None", &["None", "Friends"]),
            ],
            keywords: vec![],
            empty_default: Some("None".to_string()),
        },
        time: TimeRules {
            offset_minutes: 90,
            casual_buckets: strings(&["12:00", "14:00", "16:00", "18:00"]),
            early_label: None,
        },
        age: AgeRules {
            bands: vec![
                AgeBand::new(7, 9, "7–9"),
                AgeBand::new(10, 13, "10–13"),
                AgeBand::new(14, 18, "14–18"),
                AgeBand::new(19, 24, "19–24"),
                AgeBand::new(25, 32, "25–32"),
                AgeBand::new(33, 40, "33–40"),
            ],
            top_label: "41+".to_string(),
            fill: None,
        },
        teams: TeamRules {
            kids_rooms: strings(&["ROOM1", "ROOM2"]),
            adult_rooms: vec![],
            conditional_rooms: vec![],
            young_groups: strings(&["7–9", "10–13"]),
            other_rooms: OtherRooms::ByAge,
        },
        // 50 in 2018, rising by 5 a year
        price: PriceRules::with_defaults(
            (2018..=2026)
                .map(|year| YearPrice { year, price: 50 + (year as u32 - 2018) * 5 })
                .collect(),
            50,
        ),
        drop_duplicate_rows: true,
    }
}
