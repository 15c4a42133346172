mod common;

use covrisk::analyze::attribute_profile;
use covrisk::parsers::gocover;
use covrisk::resolve::PathResolver;

#[test]
fn parse_profile_from_disk_and_attribute() {
    let (_dir, root) = common::setup_module();
    common::write_file(&root, "cart/cart.go", common::CART);
    let profile_path = common::write_profile(&root, common::CART_BLOCKS);

    let profile = gocover::parse_file(&profile_path).unwrap();
    assert_eq!(profile.mode, "set");
    assert_eq!(profile.files.len(), 1);
    assert_eq!(profile.files[0].file_id, "example.com/shop/cart/cart.go");
    assert_eq!(profile.files[0].blocks.len(), 8);

    let resolver = PathResolver::from_root(&root).unwrap();
    let coverage = attribute_profile(&profile, &resolver);
    assert_eq!(coverage.len(), 2);

    let total = &coverage[0];
    assert_eq!(total.function, "(*Cart).Total");
    assert_eq!((total.start_line, total.end_line), (7, 13));
    assert_eq!((total.covered, total.total), (4, 4));
    assert_eq!(total.percentage, 100.0);

    let discount = &coverage[1];
    assert_eq!(discount.function, "Discount");
    assert_eq!((discount.covered, discount.total), (3, 5));
    assert!((discount.percentage - 60.0).abs() < 1e-9);
}

#[test]
fn count_mode_merges_repeated_blocks() {
    // Profiles concatenated from several test binaries repeat blocks.
    let input = b"mode: count\n\
        example.com/shop/cart/cart.go:15.44,16.27 1 0\n\
        example.com/shop/cart/cart.go:7.28,9.28 2 3\n\
        example.com/shop/cart/cart.go:15.44,16.27 1 2\n";
    let profile = gocover::parse(input).unwrap();

    let blocks = &profile.files[0].blocks;
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].start.line, 7);
    assert_eq!(blocks[1].start.line, 15);
    assert_eq!(blocks[1].count, 2);
}

#[test]
fn unresolvable_files_are_skipped() {
    let (_dir, root) = common::setup_module();
    common::write_file(&root, "cart/cart.go", common::CART);

    let input = b"mode: set\n\
        example.com/other/x.go:1.1,2.2 1 1\n\
        example.com/shop/cart/cart.go:7.28,9.28 2 1\n";
    let profile = gocover::parse(input).unwrap();
    let resolver = PathResolver::from_root(&root).unwrap();

    let coverage = attribute_profile(&profile, &resolver);
    let names: Vec<&str> = coverage.iter().map(|c| c.function.as_str()).collect();
    assert_eq!(names, vec!["(*Cart).Total", "Discount"]);
    assert_eq!(coverage[1].total, 0);
    assert_eq!(coverage[1].percentage, 0.0);
}
