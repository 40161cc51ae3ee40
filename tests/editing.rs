//! Integration tests for editing objects and their component collections.

use toolres::{prelude::*, res::TextKind};

fn labelled(id: i32, text: &str) -> Result<Label> {
    let mut label = Label::new();
    label.set_component_id(id)?;
    label.set_label(Some(text))?;
    Ok(label)
}

fn word(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// A file with one object whose two string slots point at the same text.
fn crafted_with_shared_text() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"RESF");
    word(&mut out, 101);
    word(&mut out, 12);

    // data header: strings, messages, relocations
    word(&mut out, 56);
    word(&mut out, -1);
    word(&mut out, 64);

    // object header
    word(&mut out, 0x1234);
    word(&mut out, 0);
    word(&mut out, 100);
    out.extend_from_slice(b"Plain\0\0\0\0\0\0\0");
    word(&mut out, 52);
    word(&mut out, 36);
    word(&mut out, 8);

    // body
    word(&mut out, 0);
    word(&mut out, 0);

    out.extend_from_slice(b"same\0\0\0\0");

    word(&mut out, 2);
    word(&mut out, 0);
    word(&mut out, 1);
    word(&mut out, 4);
    word(&mut out, 1);
    out
}

fn used_and_live(object: &ResObject, kind: TextKind) -> (usize, usize) {
    match object.storage() {
        RecordStorage::Owned(record) => (
            record.data().arena().buffer(kind).used(),
            record.data().live_text_size(kind).unwrap(),
        ),
        RecordStorage::Borrowed(_) => panic!("object is not owned"),
    }
}

/// Clones share their record until one of them is changed.
#[test]
fn test_copy_on_write_isolation() -> Result<()> {
    let mut original = ResObject::new("Plain", 0x1234, 100, 12);
    original.set_int(0, 10)?;
    original.set_string(4, Some("first"))?;

    let mut copy = original.clone();
    assert!(copy.ptr_eq(&original));

    copy.set_int(0, 20)?;
    assert!(!copy.ptr_eq(&original));
    assert_eq!(original.int_value(0)?, 10);
    assert_eq!(copy.int_value(0)?, 20);

    let mut second = original.clone();
    second.set_string(4, Some("second"))?;
    assert_eq!(original.text(4)?, Some("first"));
    assert_eq!(second.text(4)?, Some("second"));
    Ok(())
}

/// A component taken from a menu is a copy of the item, not a window into the menu.
#[test]
fn test_component_isolation() -> Result<()> {
    let mut menu = ResMenu::new("Main");
    menu.add(&ResMenuItem::with_text(1, "Open")?)?;

    let mut item = menu.item(1)?;
    item.set_text(Some("Close"), None)?;
    item.set_component_id(7)?;

    assert_eq!(menu.item(1)?.text()?, Some("Open"));
    assert!(!menu.contains(7)?);

    menu.replace_at(0, &item)?;
    assert_eq!(menu.item(7)?.text()?, Some("Close"));
    Ok(())
}

#[test]
fn test_erase_middle_gadget() -> Result<()> {
    let mut window = ResWindow::new("Main");
    window.add_gadget(&*labelled(1, "One")?)?;
    window.add_gadget(&*labelled(2, "Two")?)?;
    window.add_gadget(&*labelled(3, "Three")?)?;
    assert_eq!(window.gadget_count()?, 3);

    window.erase_gadget(2)?;
    assert_eq!(window.gadget_count()?, 2);
    assert_eq!(window.find_gadget(3)?, Some(1));

    let texts = window
        .gadgets()
        .map(|gadget| -> Result<String> {
            let label = Label::try_from(gadget?)?;
            Ok(label.label()?.unwrap_or_default().to_string())
        })
        .collect::<Result<Vec<_>>>()?;
    assert_eq!(texts, ["One", "Three"]);

    let (used, live) = used_and_live(&window, TextKind::Message);
    assert_eq!(used, live);
    Ok(())
}

#[test]
fn test_erase_all_gadgets_then_add() -> Result<()> {
    let mut window = ResWindow::new("Main");
    window.add_shortcut(&ResShortcut::new(0x1B, 1))?;
    window.add_gadget(&*labelled(1, "One")?)?;
    window.erase_gadget_at(0)?;
    assert_eq!(window.gadget_count()?, 0);

    window.add_gadget(&*labelled(2, "Two")?)?;
    assert_eq!(
        Label::try_from(window.gadget(2)?)?.label()?,
        Some("Two")
    );
    assert_eq!(window.shortcut(0x1B)?.event()?, 1);
    Ok(())
}

#[test]
fn test_text_arena_stays_packed() -> Result<()> {
    let mut object = ResObject::new("Texts", 0x1234, 100, 8);
    object.set_message(0, Some("Hello"))?;
    object.set_message(4, Some("Other"))?;

    object.set_message(0, Some("Hello, World!"))?;
    assert_eq!(object.text(0)?, Some("Hello, World!"));
    assert_eq!(object.text(4)?, Some("Other"));

    object.set_message(0, Some("Hi"))?;
    assert_eq!(object.text(0)?, Some("Hi"));
    assert_eq!(object.text(4)?, Some("Other"));

    let (used, live) = used_and_live(&object, TextKind::Message);
    assert_eq!(used, "Hi\0Other\0".len());
    assert_eq!(used, live);
    Ok(())
}

#[test]
fn test_duplicate_id_is_rejected() -> Result<()> {
    let mut menu = ResMenu::new("Main");
    menu.add(&ResMenuItem::with_text(1, "Info")?)?;
    menu.add(&ResMenuItem::with_text(2, "Quit")?)?;
    let before = menu.body_size();

    let result = menu.add(&ResMenuItem::with_text(2, "Again")?);
    assert!(matches!(
        result,
        Err(Error::AlreadyExists(ItemRef::MenuItem { id: 2, .. }))
    ));
    assert_eq!(menu.item_count()?, 2);
    assert_eq!(menu.body_size(), before);
    assert_eq!(menu.item(2)?.text()?, Some("Quit"));

    let mut window = ResWindow::new("Main");
    window.add_shortcut(&ResShortcut::new(0x1B, 1))?;
    assert!(matches!(
        window.add_shortcut(&ResShortcut::new(0x1B, 2)),
        Err(Error::AlreadyExists(_))
    ));
    assert_eq!(window.shortcut_count()?, 1);
    Ok(())
}

#[test]
fn test_index_out_of_range() -> Result<()> {
    let mut menu = ResMenu::new("Main");
    menu.add(&ResMenuItem::with_text(1, "Info")?)?;

    assert!(matches!(menu.item_at(1), Err(Error::RangeError { .. })));
    assert!(matches!(
        menu.insert(3, &ResMenuItem::with_text(2, "Quit")?),
        Err(Error::RangeError { .. })
    ));
    assert!(matches!(menu.erase_at(5), Err(Error::RangeError { .. })));
    assert!(matches!(menu.item(9), Err(Error::NotFound(_))));
    assert_eq!(menu.item_count()?, 1);
    Ok(())
}

#[test]
fn test_raw_file_cannot_be_promoted() -> Result<()> {
    let mut editor = ResEditor::new();
    let mut plain = ResObject::new("Plain", 0x1234, 100, 8);
    plain.set_string(4, Some("text"))?;
    editor.add(plain)?;
    let mut menu = ResMenu::new("Main");
    menu.add(&ResMenuItem::with_text(1, "Info")?)?;
    editor.add(menu)?;
    let saved = editor.save_to_vec()?;

    let res = ResFile::from_mem(saved, &ResourceConfig::raw())?;
    let mut plain = res.object("Plain")?;
    assert_eq!(plain.text(4)?, Some("text"));
    assert!(matches!(
        plain.set_int(0, 1),
        Err(Error::InvalidOperation(_))
    ));

    let mut menu = ResMenu::try_from(res.object("Main")?)?;
    assert!(matches!(
        menu.set_title(Some("Changed"), None),
        Err(Error::InvalidOperation(_))
    ));
    assert_eq!(menu.title()?, None);

    // Components know their own relocations.
    let mut item = menu.item(1)?;
    item.set_text(Some("About"), None)?;
    assert!(!item.is_read_only());
    assert_eq!(item.text()?, Some("About"));
    assert_eq!(menu.item(1)?.text()?, Some("Info"));
    Ok(())
}

#[test]
fn test_typed_view_of_wrong_class() -> Result<()> {
    let object: ResObject = ResMenu::new("Main").into();
    assert!(matches!(
        ResWindow::try_from(object),
        Err(Error::ClassMismatch { .. })
    ));

    let gadget: ResGadget = Label::new().into();
    assert!(matches!(
        Button::try_from(gadget),
        Err(Error::TypeMismatch { .. })
    ));
    Ok(())
}

/// Slots sharing one text keep their own value when one of them is edited.
#[test]
fn test_shared_text_edit_under_lenient() -> Result<()> {
    let data = crafted_with_shared_text();
    let mut editor = ResEditor::load_from_mem(&data, &ResourceConfig::lenient())?;
    assert_eq!(editor.save_to_vec()?, data);

    let plain = editor.object_mut("Plain")?;
    assert_eq!(plain.text(0)?, Some("same"));
    assert_eq!(plain.text(4)?, Some("same"));

    plain.set_string(0, Some("changed"))?;
    assert_eq!(plain.text(0)?, Some("changed"));
    assert_eq!(plain.text(4)?, Some("same"));

    let saved = editor.save_to_vec()?;
    let reloaded = ResEditor::load_from_mem(&saved, &ResourceConfig::default())?;
    let plain = reloaded.object("Plain")?;
    assert_eq!(plain.text(0)?, Some("changed"));
    assert_eq!(plain.text(4)?, Some("same"));
    Ok(())
}

#[test]
fn test_shared_text_cleared_without_normalising() -> Result<()> {
    let data = crafted_with_shared_text();
    let config = ResourceConfig::default().with_normalise_text(false);
    let mut editor = ResEditor::load_from_mem(&data, &config)?;

    let plain = editor.object_mut("Plain")?;
    plain.set_string(4, None)?;
    assert_eq!(plain.text(0)?, Some("same"));
    assert_eq!(plain.text(4)?, None);

    plain.set_string(0, Some("sam"))?;
    assert_eq!(plain.text(0)?, Some("sam"));

    let saved = editor.save_to_vec()?;
    let reloaded = ResEditor::load_from_mem(&saved, &ResourceConfig::default())?;
    assert_eq!(reloaded.object("Plain")?.text(0)?, Some("sam"));
    assert_eq!(reloaded.object("Plain")?.text(4)?, None);
    Ok(())
}

#[test]
fn test_shared_text_from_lenient_resfile() -> Result<()> {
    let res = ResFile::from_mem(crafted_with_shared_text(), &ResourceConfig::lenient())?;
    let mut plain = res.object("Plain")?;
    plain.set_string(4, Some("other"))?;
    assert_eq!(plain.text(0)?, Some("same"));
    assert_eq!(plain.text(4)?, Some("other"));
    assert_eq!(res.object("Plain")?.text(4)?, Some("same"));
    Ok(())
}
