use std::path::Path;

const DATA_FILES: [&str; 4] = [
    "data/preset_categories.json",
    "data/preset_defaults.json",
    "data/preset_fields.json",
    "data/preset_presets.json",
];

fn main() {
    let presets = read_data_file(Path::new("data/preset_presets.json"));
    validate_presets(&presets);

    let defaults = read_data_file(Path::new("data/preset_defaults.json"));
    validate_defaults(&defaults, &presets);

    let fields = read_data_file(Path::new("data/preset_fields.json"));
    validate_fields(&fields);

    let categories = read_data_file(Path::new("data/preset_categories.json"));
    validate_categories(&categories);

    println!(
        "cargo:warning=Validated catalog: {} presets, {} fields, {} categories",
        object_len(&presets),
        object_len(&fields),
        object_len(&categories)
    );

    set_build_dependencies();
}

fn object_len(value: &serde_json::Value) -> usize {
    value.as_object().map_or(0, serde_json::Map::len)
}

fn read_data_file(path: &Path) -> serde_json::Value {
    // Ensure data file exists at build time
    assert!(
        path.exists(),
        "\n\nCATALOG BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the data file before building.\n",
        path.display()
    );

    let contents = std::fs::read_to_string(path).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            path.display()
        );
    });

    let value: serde_json::Value = serde_json::from_str(&contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            path.display()
        );
    });

    assert!(
        value.is_object(),
        "\n\nCATALOG BUILD ERROR: Root must be a JSON object\n\
         Path: {}\n",
        path.display()
    );

    value
}

fn validate_presets(presets: &serde_json::Value) {
    let Some(presets) = presets.as_object() else {
        return;
    };

    for (id, preset) in presets {
        let geometry = preset.get("geometry").and_then(|g| g.as_array());
        assert!(
            geometry.is_some(),
            "\n\nCATALOG BUILD ERROR: Preset '{id}' must have a 'geometry' array\n"
        );
        assert!(
            geometry.is_some_and(|g| !g.is_empty()),
            "\n\nCATALOG BUILD ERROR: Preset '{id}' has an empty 'geometry' array\n"
        );
        assert!(
            preset.get("tags").is_some_and(serde_json::Value::is_object),
            "\n\nCATALOG BUILD ERROR: Preset '{id}' must have a 'tags' object\n"
        );

        if let Some(score) = preset.get("matchScore") {
            assert!(
                score.as_f64().is_some_and(|s| s >= 0.0),
                "\n\nCATALOG BUILD ERROR: Preset '{id}' has invalid 'matchScore': {score}\n\
                 Scores must be non-negative numbers.\n"
            );
        }
    }
}

fn validate_defaults(defaults: &serde_json::Value, presets: &serde_json::Value) {
    let Some(defaults) = defaults.as_object() else {
        return;
    };

    for (geometry, ids) in defaults {
        let ids = ids.as_array().unwrap_or_else(|| {
            panic!(
                "\n\nCATALOG BUILD ERROR: Defaults for '{geometry}' must be an array\n\
                 Got: {ids}\n"
            );
        });

        for id in ids {
            let id = id.as_str().unwrap_or("<not a string>");
            assert!(
                presets.get(id).is_some(),
                "\n\nCATALOG BUILD ERROR: Defaults for '{geometry}' name unknown preset '{id}'\n"
            );
        }
    }
}

fn validate_fields(fields: &serde_json::Value) {
    let Some(fields) = fields.as_object() else {
        return;
    };

    for (id, field) in fields {
        assert!(
            field.is_object(),
            "\n\nCATALOG BUILD ERROR: Field '{id}' must be an object\n"
        );
    }
}

fn validate_categories(categories: &serde_json::Value) {
    let Some(categories) = categories.as_object() else {
        return;
    };

    for (id, category) in categories {
        assert!(
            category.get("members").is_some_and(serde_json::Value::is_array),
            "\n\nCATALOG BUILD ERROR: Category '{id}' must have a 'members' array\n"
        );
    }
}

fn set_build_dependencies() {
    // Tell cargo to rerun if the catalog changes
    for file in DATA_FILES {
        println!("cargo:rerun-if-changed={file}");
    }

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
