/// Sheet, branch and cell names shared across the bootstrap pipeline.
/// The sheet names are the tab names of the published spreadsheets and must
/// match them exactly.

// Field-mapping configuration sheets
pub const PERFIL_INFORMACION_GENERAL_CONFIG: &str = "perfil-informacion-general-configuracion";
pub const PERFIL_RECUADROS_CONFIG: &str = "perfil-recuadros-configuracion";
pub const PERFIL_FRENTE_A_FRENTE_CONFIG: &str = "perfil-frente-a-frente-configuracion";
pub const DIPUTADO_INFORMACION_GENERAL_CONFIG: &str = "diputado-informacion-general-configuracion";

// Model configuration sheets
pub const SETTINGS_SHEET: &str = "configuracion";
pub const NAV_LINKS_SHEET: &str = "navbar-links";

// Domain record sheets
pub const PARTIES_SHEET: &str = "partidos";
pub const PROFILES_SHEET: &str = "perfiles";
pub const DEPUTIES_SHEET: &str = "diputados";

// Composite model branches (used in errors, logs and metric labels)
pub const PARTIES_BRANCH: &str = "parties";
pub const PROFILES_BRANCH: &str = "profiles";
pub const DEPUTIES_BRANCH: &str = "deputies";
pub const SETTINGS_BRANCH: &str = "settings";
pub const NAV_LINKS_BRANCH: &str = "navLinks";

// Cell names
pub const FIELD_CELL: &str = "field";
pub const LABEL_CELL: &str = "label";
pub const SECTION_CELL: &str = "section";
pub const KEY_CELL: &str = "key";
pub const VALUE_CELL: &str = "value";
pub const ROUTE_CELL: &str = "route";
pub const ID_CELL: &str = "id";

// Labeled field groups produced by the record serializers
pub const INFORMACION_GENERAL_GROUP: &str = "informacionGeneral";
pub const RECUADROS_GROUP: &str = "recuadros";
pub const FRENTE_A_FRENTE_GROUP: &str = "frenteAFrente";

// Startup configuration
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DATA_SOURCE_URL_ENV: &str = "SHEET_DATA_SOURCE_URL";
pub const CONFIG_SOURCE_URL_ENV: &str = "SHEET_CONFIG_SOURCE_URL";
pub const METRICS_PORT_ENV: &str = "SHEET_METRICS_PORT";
