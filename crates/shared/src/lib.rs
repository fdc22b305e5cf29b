use serde::{Deserialize, Serialize};

/// Инструмент редактора (активное состояние взаимодействия)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Выбор (только подсветка попадания)
    #[default]
    Default,
    Move,
    Rotate,
    Delete,
    Replace,
}

impl ToolKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Default => "Select",
            ToolKind::Move => "Move",
            ToolKind::Rotate => "Rotate",
            ToolKind::Delete => "Delete",
            ToolKind::Replace => "Replace with cylinder",
        }
    }

    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Default,
            ToolKind::Move,
            ToolKind::Rotate,
            ToolKind::Delete,
            ToolKind::Replace,
        ]
    }
}

/// Метод упрощения сетки (внешний процесс)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimplifyMethod {
    QuadricEdgeCollapse,
    FastQuadricDecimation,
    VertexClustering,
}

impl SimplifyMethod {
    /// Имя метода, которое ожидает процесс упрощения
    pub fn as_str(&self) -> &'static str {
        match self {
            SimplifyMethod::QuadricEdgeCollapse => "quadric_edge_collapse",
            SimplifyMethod::FastQuadricDecimation => "fast_quadric_decimation",
            SimplifyMethod::VertexClustering => "vertex_clustering",
        }
    }

    /// Заголовок для индикатора прогресса
    pub fn display_name(&self) -> &'static str {
        match self {
            SimplifyMethod::QuadricEdgeCollapse => "Quadric Edge Collapse Simplification",
            SimplifyMethod::FastQuadricDecimation => "Fast Quadric Decimation",
            SimplifyMethod::VertexClustering => "Vertex Clustering Simplification",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "quadric_edge_collapse" => Some(SimplifyMethod::QuadricEdgeCollapse),
            "fast_quadric_decimation" => Some(SimplifyMethod::FastQuadricDecimation),
            "vertex_clustering" => Some(SimplifyMethod::VertexClustering),
            _ => None,
        }
    }
}

/// Формат результата развёртки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportFormat {
    #[default]
    Svg,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "SVG",
            ExportFormat::Pdf => "PDF",
        }
    }
}

/// Размер страницы для развёртки
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Страница с нулевой стороной не принимается процессом развёртки
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Увеличить обе стороны на единицу (повтор после переполнения страницы)
    pub fn enlarged(&self) -> Self {
        Self {
            width: self.width + 1.0,
            height: self.height + 1.0,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self {
            width: 25.0,
            height: 25.0,
        }
    }
}

/// Процедурный примитив
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Box {
        center: [f32; 3],
        width: f32,
        height: f32,
        depth: f32,
    },
    Cylinder {
        center: [f32; 3],
        radius: f32,
        height: f32,
        #[serde(default = "default_segments")]
        segments: u32,
    },
}

fn default_segments() -> u32 {
    32
}

/// RGB-цвет в диапазоне 0..1
pub type Rgb = [f32; 3];

pub const RED: Rgb = [1.0, 0.0, 0.0];
pub const GREY: Rgb = [0.5, 0.5, 0.5];
pub const CYAN: Rgb = [0.0, 1.0, 1.0];

/// Именованная палитра цветов сетки (ключи без пробелов, в нижнем регистре)
const PALETTE: &[(&str, Rgb)] = &[
    ("red", RED),
    ("orange", [1.0, 0.65, 0.0]),
    ("yellow", [1.0, 1.0, 0.0]),
    ("green", [0.0, 1.0, 0.0]),
    ("blue", [0.0, 0.0, 1.0]),
    ("indigo", [0.29, 0.0, 0.51]),
    ("violet", [0.93, 0.51, 0.93]),
    ("brown", [0.65, 0.16, 0.16]),
    ("cyan", CYAN),
    ("grey", GREY),
    ("lime", [0.75, 1.0, 0.0]),
    ("magenta", [1.0, 0.0, 1.0]),
    ("maroon", [0.5, 0.0, 0.0]),
    ("navy", [0.0, 0.0, 0.5]),
    ("olive", [0.5, 0.5, 0.0]),
    ("pink", [1.0, 0.75, 0.8]),
    ("purple", [0.5, 0.0, 0.5]),
    ("silver", [0.75, 0.75, 0.75]),
    ("teal", [0.0, 0.5, 0.5]),
    ("white", [1.0, 1.0, 1.0]),
    ("black", [0.0, 0.0, 0.0]),
];

/// Найти цвет по имени ("Light Grey" и "lightgrey" эквивалентны)
pub fn named_color(name: &str) -> Option<Rgb> {
    let key: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    PALETTE
        .iter()
        .find(|(n, _)| *n == key)
        .map(|(_, rgb)| *rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_kind_serde() {
        let json = serde_json::to_string(&ToolKind::Replace).unwrap();
        assert_eq!(json, "\"replace\"");
        let back: ToolKind = serde_json::from_str("\"move\"").unwrap();
        assert_eq!(back, ToolKind::Move);
    }

    #[test]
    fn test_simplify_method_names() {
        for method in [
            SimplifyMethod::QuadricEdgeCollapse,
            SimplifyMethod::FastQuadricDecimation,
            SimplifyMethod::VertexClustering,
        ] {
            assert_eq!(SimplifyMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(SimplifyMethod::parse("remesh"), None);
    }

    #[test]
    fn test_named_color_normalizes_key() {
        assert_eq!(named_color("Red"), Some(RED));
        assert_eq!(named_color(" G rey "), Some(GREY));
        assert_eq!(named_color("chartreuse"), None);
    }

    #[test]
    fn test_page_size_enlarged() {
        let page = PageSize::default().enlarged();
        assert_eq!(page, PageSize::new(26.0, 26.0));
        assert!(!PageSize::new(0.0, 10.0).is_valid());
    }

    #[test]
    fn test_primitive_default_segments() {
        let json = r#"{"type": "cylinder", "center": [0, 0, 0], "radius": 1, "height": 2}"#;
        let p: Primitive = serde_json::from_str(json).unwrap();
        match p {
            Primitive::Cylinder { segments, .. } => assert_eq!(segments, 32),
            _ => panic!("Expected Cylinder"),
        }
    }
}
