#![no_main]

use libfuzzer_sys::fuzz_target;
use toolres::{ResEditor, ResFile, ResourceConfig};

fuzz_target!(|data: &[u8]| {
    let config = ResourceConfig::default();
    if let Ok(editor) = ResEditor::load_from_mem(data, &config) {
        let _ = editor.save_to_vec();
    }
    if let Ok(res) = ResFile::from_mem(data.to_vec(), &config) {
        for object in &res {
            let _ = object.to_owned_record();
        }
    }
    let _ = ResFile::from_mem(data.to_vec(), &ResourceConfig::raw());
});
