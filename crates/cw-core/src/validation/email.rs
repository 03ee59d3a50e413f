/// Local email shape check.
///
/// This only rejects obviously malformed input; whether the address is
/// already registered is an asynchronous property resolved by the
/// checkout service, see `cw-app`'s availability probe.
pub fn validate_email_shape(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    // Domain needs at least one interior dot.
    match domain.split_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
