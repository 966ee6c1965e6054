use ditter_core::registry::algorithms_in;
use ditter_core::{Category, Rgb, BUILTIN_PALETTES};
use serde::Serialize;

/// Everything a front-end needs to build its pickers.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub categories: Vec<CategoryInfo>,
    pub palettes: Vec<PaletteInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub id: Category,
    pub algorithms: Vec<AlgorithmInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmInfo {
    pub id: &'static str,
    pub name: &'static str,
    /// Runs on the GPU engine when one is available.
    pub gpu: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaletteInfo {
    pub name: &'static str,
    pub category: &'static str,
    pub colors: Vec<Rgb>,
}

impl Catalog {
    pub fn build() -> Self {
        let categories = Category::ALL
            .into_iter()
            .map(|category| CategoryInfo {
                id: category,
                algorithms: algorithms_in(category)
                    .map(|e| AlgorithmInfo {
                        id: e.id,
                        name: e.name,
                        gpu: e.gpu_eligible(),
                    })
                    .collect(),
            })
            .collect();

        let palettes = BUILTIN_PALETTES
            .iter()
            .map(|p| PaletteInfo {
                name: p.name,
                category: p.category,
                colors: p.palette().colors().to_vec(),
            })
            .collect();

        Self {
            categories,
            palettes,
        }
    }

    pub fn algorithm_count(&self) -> usize {
        self.categories.iter().map(|c| c.algorithms.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditter_core::registry::algorithms;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_catalog_covers_registry() {
        let catalog = Catalog::build();
        assert_eq!(catalog.categories.len(), Category::ALL.len());
        assert_eq!(catalog.algorithm_count(), algorithms().len());
        assert_eq!(catalog.palettes.len(), BUILTIN_PALETTES.len());
    }

    #[test]
    fn test_catalog_json_shape() {
        let json = serde_json::to_value(Catalog::build()).unwrap();
        let first = &json["categories"][0];
        assert_eq!(first["id"], "error-diffusion");
        let fs = first["algorithms"]
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["id"] == "floyd-steinberg")
            .expect("floyd-steinberg listed");
        assert_eq!(fs["gpu"], false, "error diffusion is CPU-only");

        let bw = json["palettes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "bw")
            .expect("bw palette listed");
        assert_eq!(bw["colors"].as_array().unwrap().len(), 2);
    }
}
