use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Time a simulation system when the `perf_stats` feature is enabled.
///
/// The function body is left untouched; a drop guard is inserted in front of it
/// that logs the elapsed time when the system returns. Without `perf_stats`
/// the guard is compiled out entirely.
///
/// If the system takes a `tick: Res<SimTick>` parameter, the guard also logs
/// every 100th tick regardless of duration so slow drift stays visible.
///
/// ```rust,ignore
/// #[profile]
/// pub fn integrate_motion(tick: Res<SimTick>, /* ... */) { /* ... */ }
///
/// #[profile(4)] // only report runs slower than 4ms
/// pub fn resolve_unit_collisions(/* ... */) { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().trim().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let system_name = sig.ident.to_string();

    let has_tick_param = sig.inputs.iter().any(|arg| {
        let FnArg::Typed(pat_type) = arg else {
            return false;
        };
        let Pat::Ident(pat_ident) = &*pat_type.pat else {
            return false;
        };
        let ty = &pat_type.ty;
        pat_ident.ident == "tick" && quote!(#ty).to_string().contains("SimTick")
    });

    let tick_field = if has_tick_param {
        quote! { Some(tick.0) }
    } else {
        quote! { None }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_guard = {
                struct ProfileGuard {
                    name: &'static str,
                    start: std::time::Instant,
                    tick: Option<u64>,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        let periodic = self.tick.map_or(false, |t| t % 100 == 0);
                        if elapsed.as_millis() > #threshold_ms || periodic {
                            bevy::prelude::info!("[PERF] {} {:?} (tick {:?})", self.name, elapsed, self.tick);
                        }
                    }
                }
                ProfileGuard {
                    name: #system_name,
                    start: std::time::Instant::now(),
                    tick: #tick_field,
                }
            };

            #block
        }
    };

    output.into()
}
