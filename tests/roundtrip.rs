//! Integration tests for saving and loading complete resource files.
//!
//! Every test builds objects through the public API, saves them and checks that loading the
//! result gives back the same objects and, when saved again, the same bytes.

use toolres::prelude::*;

fn build_editor() -> Result<ResEditor> {
    let mut menu = ResMenu::new("Main");
    menu.set_title(Some("Application"), None)?;
    menu.set_help_message(Some("The main menu"), Some(40))?;
    let mut info = ResMenuItem::with_text(1, "Info")?;
    info.set_click_show(Some("ProgInfo"))?;
    menu.add(&info)?;
    let mut quit = ResMenuItem::with_text(2, "Quit")?;
    quit.set_flags(MenuItemFlags::DOTTED)?;
    quit.set_click_event(0x82a91)?;
    menu.add(&quit)?;

    let mut window = ResWindow::new("Main_W");
    window.set_title_text(Some("Hello, World!"))?;
    window.set_menu(Some("Main"))?;
    window.set_sprite_area(Some(SpriteArea::CLIENT))?;
    window.add_shortcut(&ResShortcut::new(0x1B, 0x100))?;

    let mut label = Label::new();
    label.set_component_id(1)?;
    label.set_label(Some("Name"))?;
    window.add_gadget(&label)?;

    let mut field = DisplayField::new();
    field.set_component_id(2)?;
    field.set_text(Some("Value"))?;
    field.set_justification(Justification::Right)?;
    window.add_gadget(&field)?;

    let mut button = ActionButton::new();
    button.set_component_id(3)?;
    button.set_text(Some("OK"))?;
    button.set_button_flags(ActionButtonFlags::DEFAULT)?;
    window.add_gadget(&button)?;

    let mut editor = ResEditor::new();
    editor.add(menu)?;
    editor.add(window)?;
    editor.add(ResWindow::new_toolbar("Tools"))?;
    Ok(editor)
}

#[test]
fn test_save_load_save_is_stable() -> Result<()> {
    let saved = build_editor()?.save_to_vec()?;
    let loaded = ResEditor::load_from_mem(&saved, &ResourceConfig::default())?;
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.save_to_vec()?, saved);
    Ok(())
}

#[test]
fn test_file_round_trip() -> Result<()> {
    let dir = tempfile::tempdir().map_err(Error::FileError)?;
    let path = dir.path().join("Res");

    let editor = build_editor()?;
    editor.save(&path)?;
    let expected = editor.save_to_vec()?;
    assert_eq!(std::fs::read(&path).map_err(Error::FileError)?, expected);

    let reloaded = ResEditor::load(&path, &ResourceConfig::default())?;
    assert_eq!(reloaded.save_to_vec()?, expected);

    let res = ResFile::from_file(&path, &ResourceConfig::default())?;
    assert_eq!(res.len(), 3);
    let names: Vec<String> = res.objects().map(|o| o.name().into_owned()).collect();
    assert_eq!(names, ["Main", "Main_W", "Tools"]);
    Ok(())
}

#[test]
fn test_loaded_values_match() -> Result<()> {
    let saved = build_editor()?.save_to_vec()?;
    let config = ResourceConfig::default().with_sprite_area(SpriteArea(0x8000));

    let editor = ResEditor::load_from_mem(&saved, &config)?;
    check_menu(&ResMenu::try_from(editor.object("Main")?.clone())?)?;
    check_window(&ResWindow::try_from(editor.object("Main_W")?.clone())?)?;

    let res = ResFile::from_mem(saved, &config)?;
    check_menu(&ResMenu::try_from(res.object("Main")?)?)?;
    check_window(&ResWindow::try_from(res.object("Main_W")?)?)?;
    Ok(())
}

fn check_menu(menu: &ResMenu) -> Result<()> {
    assert_eq!(menu.title()?, Some("Application"));
    assert_eq!(menu.help_message()?, Some("The main menu"));
    assert_eq!(menu.max_help_message()?, 40);
    assert_eq!(menu.item_count()?, 2);

    let info = menu.item(1)?;
    assert_eq!(info.text()?, Some("Info"));
    assert_eq!(info.click_show()?, Some("ProgInfo"));
    assert_eq!(info.submenu_show()?, None);

    let quit = menu.item_at(1)?;
    assert_eq!(quit.component_id()?, 2);
    assert_eq!(quit.flags()?, MenuItemFlags::DOTTED);
    assert_eq!(quit.click_event()?, 0x82a91);
    Ok(())
}

fn check_window(window: &ResWindow) -> Result<()> {
    assert_eq!(window.title_text()?, Some("Hello, World!"));
    assert_eq!(window.menu()?, Some("Main"));
    assert_eq!(window.sprite_area()?, Some(SpriteArea(0x8000)));
    assert_eq!(window.shortcut_count()?, 1);
    assert_eq!(window.shortcut_at(0)?.event()?, 0x100);

    assert_eq!(window.gadget_count()?, 3);
    let label = Label::try_from(window.gadget(1)?)?;
    assert_eq!(label.label()?, Some("Name"));
    let field = DisplayField::try_from(window.gadget(2)?)?;
    assert_eq!(field.text()?, Some("Value"));
    assert_eq!(field.justification()?, Justification::Right);
    let button = ActionButton::try_from(window.gadget_at(2)?)?;
    assert_eq!(button.text()?, Some("OK"));
    assert_eq!(button.button_flags()?, ActionButtonFlags::DEFAULT);
    Ok(())
}

#[test]
fn test_minus_one_survives() -> Result<()> {
    let mut plain = ResObject::new("Plain", 0x1234, 100, 8);
    plain.set_int(0, -1)?;
    plain.set_message(4, None)?;

    let mut editor = ResEditor::new();
    editor.add(ResMenu::new("Menu"))?;
    editor.add(plain)?;
    let saved = editor.save_to_vec()?;

    let loaded = ResEditor::load_from_mem(&saved, &ResourceConfig::default())?;
    let plain = loaded.object("Plain")?;
    assert_eq!(plain.int_value(0)?, -1);
    assert_eq!(plain.text(4)?, None);

    let menu = ResMenu::try_from(loaded.object("Menu")?.clone())?;
    assert_eq!(menu.about_to_be_shown_event()?, -1);
    assert_eq!(menu.has_been_hidden_event()?, -1);
    assert_eq!(menu.title()?, None);
    Ok(())
}

#[test]
fn test_edit_loaded_file_and_save() -> Result<()> {
    let saved = build_editor()?.save_to_vec()?;
    let res = ResFile::from_mem(saved, &ResourceConfig::default())?;

    let mut window = ResWindow::try_from(res.object("Main_W")?)?;
    window.erase_gadget(2)?;
    window.set_title_text(Some("Hi"))?;

    let mut editor = ResEditor::new();
    for object in &res {
        editor.add(object.clone())?;
    }
    editor.replace(window)?;
    let edited = editor.save_to_vec()?;

    let reloaded = ResEditor::load_from_mem(&edited, &ResourceConfig::default())?;
    let window = ResWindow::try_from(reloaded.object("Main_W")?.clone())?;
    assert_eq!(window.title_text()?, Some("Hi"));
    assert_eq!(window.gadget_count()?, 2);
    assert!(!window.contains_gadget(2)?);
    assert_eq!(
        ActionButton::try_from(window.gadget(3)?)?.text()?,
        Some("OK")
    );
    assert_eq!(reloaded.save_to_vec()?, edited);
    Ok(())
}

#[test]
fn test_failed_save_keeps_existing_file() -> Result<()> {
    let dir = tempfile::tempdir().map_err(Error::FileError)?;
    let path = dir.path().join("Res");

    let editor = build_editor()?;
    editor.save(&path)?;
    let before = std::fs::read(&path).map_err(Error::FileError)?;

    let mut plain = ResObject::new("Plain", 0x1234, 100, 8);
    plain.set_string(4, Some("text"))?;
    let mut source = ResEditor::new();
    source.add(plain)?;
    let raw = ResFile::from_mem(source.save_to_vec()?, &ResourceConfig::raw())?;

    let mut broken = ResEditor::new();
    broken.add(raw.object("Plain")?)?;
    assert!(matches!(
        broken.save(&path),
        Err(Error::InvalidOperation(_))
    ));
    assert_eq!(std::fs::read(&path).map_err(Error::FileError)?, before);

    let blocked = dir.path().join("Blocked");
    std::fs::create_dir(&blocked).map_err(Error::FileError)?;
    std::fs::write(blocked.join("inner"), b"kept").map_err(Error::FileError)?;
    assert!(matches!(
        editor.save(&blocked),
        Err(Error::WriteFinalizationFailed { .. })
    ));
    assert_eq!(
        std::fs::read(blocked.join("inner")).map_err(Error::FileError)?,
        b"kept"
    );

    let entries = std::fs::read_dir(dir.path()).map_err(Error::FileError)?.count();
    assert_eq!(entries, 2);
    Ok(())
}
