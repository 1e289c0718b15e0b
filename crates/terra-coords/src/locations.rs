use crate::Location;

/// Sites marked on the globe by default.
pub const DEFAULT_LOCATIONS: [Location; 14] = [
    Location::new("Bogotá, Colombia", 4.642477, -74.119466),
    Location::new("Yantai, China", 37.505996, 121.376953),
    Location::new("Shanghai, China", 31.230416, 121.473701),
    Location::new("Düsseldorf, Germany", 51.227741, 6.773456),
    Location::new("Montornès del Vallès, Spain", 41.544987, 2.256310),
    Location::new("Kurkumbh, India", 18.315196, 74.564888),
    Location::new("Songdo, South Korea", 37.387553, 126.643573),
    Location::new("Bien Hoa, Vietnam", 10.944332, 106.821991),
    Location::new("Bac Ninh, Vietnam", 21.186928, 106.071644),
    Location::new("Kruševac, Serbia", 43.58, 21.333),
    Location::new("Inđija, Serbia", 45.048676, 20.079016),
    Location::new("Maribor, Slovenia", 46.55465, 15.645881),
    Location::new("Ferentino, Italy", 41.765685, 13.233647),
    Location::new("Racibórz, Poland", 50.09116, 18.219565),
];
