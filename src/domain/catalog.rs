//! Retail resources grouped the way the dashboard charts them.

/// A store type and the retail resources it sells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub slug: &'static str,
    pub title: &'static str,
    pub resources: &'static [u32],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        slug: "fresh-store",
        title: "Fresh Store",
        resources: &[
            3, 4, 5, 7, 8, 9, 67, 119, 122, 123, 124, 125, 126, 127, 140, 144,
        ],
    },
    Category {
        slug: "hardware-store",
        title: "Hardware Store",
        resources: &[102, 103, 108, 109, 110],
    },
    Category {
        slug: "gas-station",
        title: "Gas Station",
        resources: &[11, 12],
    },
    Category {
        slug: "fashion-store",
        title: "Fashion Store",
        resources: &[60, 61, 62, 63, 64, 65, 70, 71],
    },
    Category {
        slug: "electronics-store",
        title: "Electronics Store",
        resources: &[24, 25, 26, 27, 28, 98],
    },
    Category {
        slug: "car-dealership",
        title: "Car Dealership",
        resources: &[53, 54, 55, 56, 57],
    },
    Category {
        slug: "aerospace",
        title: "Aerospace",
        resources: &[91, 94, 95, 96, 97, 99],
    },
];

const RESOURCE_NAMES: &[(u32, &str)] = &[
    (3, "Apples"),
    (4, "Oranges"),
    (5, "Grapes"),
    (7, "Steak"),
    (8, "Sausages"),
    (9, "Eggs"),
    (11, "Petrol"),
    (12, "Diesel"),
    (24, "Smart phones"),
    (25, "Tablets"),
    (26, "Laptops"),
    (27, "Monitors"),
    (28, "Televisions"),
    (53, "Economy e-car"),
    (54, "Luxury e-car"),
    (55, "Economy car"),
    (56, "Luxury car"),
    (57, "Truck"),
    (60, "Underwear"),
    (61, "Gloves"),
    (62, "Dress"),
    (63, "Stiletto heel"),
    (64, "Handbags"),
    (65, "Sneakers"),
    (67, "Xmas crackers"),
    (70, "Luxury watch"),
    (71, "Necklace"),
    (98, "Quadcopter"),
    (102, "Bricks"),
    (103, "Cement"),
    (108, "Planks"),
    (109, "Windows"),
    (110, "Tools"),
    (119, "Ground coffee"),
    (120, "Vegetables"),
    (121, "Bread"),
    (122, "Cheese"),
    (123, "Apple pie"),
    (124, "Orange juice"),
    (125, "Apple cider"),
    (126, "Ginger beer"),
    (127, "Frozen pizza"),
    (128, "Pasta"),
    (140, "Chocolate"),
    (144, "Xmas ornament"),
];

/// Find a category by slug, ignoring case
pub fn category(slug: &str) -> Option<&'static Category> {
    CATEGORIES
        .iter()
        .find(|c| c.slug.eq_ignore_ascii_case(slug.trim()))
}

/// Display name of a resource, if known
pub fn resource_name(id: u32) -> Option<&'static str> {
    RESOURCE_NAMES
        .iter()
        .find(|(rid, _)| *rid == id)
        .map(|(_, name)| *name)
}
