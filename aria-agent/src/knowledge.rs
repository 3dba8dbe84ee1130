//! Static travel knowledge the assistant is primed with

/// An airline and what it flies
#[derive(Debug)]
pub struct Airline {
    pub name: &'static str,
    pub hubs: &'static [&'static str],
    pub fleet: &'static [&'static str],
    pub classes: &'static [&'static str],
    pub partners: &'static [&'static str],
}

#[derive(Debug)]
pub struct Airport {
    pub code: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub country: &'static str,
    pub terminals: &'static [&'static str],
}

/// A city pair, keyed like `AKL-DEL`
#[derive(Debug)]
pub struct Route {
    pub code: &'static str,
    pub distance: &'static str,
    pub duration: &'static str,
    pub aircraft: &'static str,
    pub frequency: &'static str,
}

/// Who the assistant is and what it knows
#[derive(Debug)]
pub struct Persona {
    pub name: &'static str,
    pub role: &'static str,
    pub capabilities: &'static [&'static str],
    pub airlines: &'static [Airline],
    pub airports: &'static [Airport],
    pub routes: &'static [Route],
}

impl Persona {
    pub fn airline_names(&self) -> Vec<&'static str> {
        self.airlines.iter().map(|a| a.name).collect()
    }

    pub fn airport_codes(&self) -> Vec<&'static str> {
        self.airports.iter().map(|a| a.code).collect()
    }

    pub fn route_codes(&self) -> Vec<&'static str> {
        self.routes.iter().map(|r| r.code).collect()
    }
}

pub static ARIA: Persona = Persona {
    name: "Aria",
    role: "Air New Zealand AI Travel Specialist",
    capabilities: &[
        "Real-time flight data analysis",
        "Dynamic pricing intelligence",
        "Route optimization",
        "Travel trend prediction",
        "Multi-source data integration",
        "Personalized recommendations",
        "Proactive problem solving",
        "Context-aware conversations",
    ],
    airlines: &[Airline {
        name: "Air New Zealand",
        hubs: &["AKL", "WLG", "CHC", "ZQN"],
        fleet: &[
            "Boeing 777-300ER",
            "Boeing 787-9 Dreamliner",
            "Airbus A320neo",
            "ATR 72-600",
        ],
        classes: &[
            "Economy",
            "Works Deluxe",
            "Premium Economy",
            "Business Premier",
        ],
        partners: &[
            "Star Alliance",
            "United Airlines",
            "Singapore Airlines",
            "ANA",
        ],
    }],
    airports: &[
        Airport {
            code: "AKL",
            name: "Auckland Airport",
            city: "Auckland",
            country: "New Zealand",
            terminals: &["Domestic", "International"],
        },
        Airport {
            code: "DEL",
            name: "Indira Gandhi International",
            city: "Delhi",
            country: "India",
            terminals: &["T3"],
        },
        Airport {
            code: "SIN",
            name: "Changi Airport",
            city: "Singapore",
            country: "Singapore",
            terminals: &["T1", "T2", "T3"],
        },
        Airport {
            code: "SYD",
            name: "Sydney Kingsford Smith",
            city: "Sydney",
            country: "Australia",
            terminals: &["T1"],
        },
        Airport {
            code: "LHR",
            name: "Heathrow Airport",
            city: "London",
            country: "UK",
            terminals: &["T2"],
        },
        Airport {
            code: "LAX",
            name: "Los Angeles International",
            city: "Los Angeles",
            country: "USA",
            terminals: &["TBIT"],
        },
    ],
    routes: &[
        Route {
            code: "AKL-DEL",
            distance: "12,400 km",
            duration: "15-17h",
            aircraft: "Boeing 787-9",
            frequency: "Daily",
        },
        Route {
            code: "AKL-SIN",
            distance: "8,800 km",
            duration: "10-11h",
            aircraft: "Boeing 787-9",
            frequency: "2x Daily",
        },
        Route {
            code: "AKL-SYD",
            distance: "2,200 km",
            duration: "3-4h",
            aircraft: "Airbus A320",
            frequency: "10x Daily",
        },
        Route {
            code: "AKL-LAX",
            distance: "10,500 km",
            duration: "12-13h",
            aircraft: "Boeing 777-300ER",
            frequency: "Daily",
        },
    ],
};
